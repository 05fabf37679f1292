//! Coverage and rank analysis over a set of shift vectors.

use std::collections::BTreeSet;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;

use crate::lattice::ShiftVector;

/// Basis indices joined by at least one unit-step edge between two nodes.
///
/// # Examples
/// ```
/// use looptopo_core::{ShiftVector, covered_directions};
///
/// let nodes = [
///     ShiftVector::new(vec![0, 0, 0]),
///     ShiftVector::new(vec![0, -1, 0]),
///     ShiftVector::new(vec![1, -1, 1]),
/// ];
/// let covered: Vec<usize> = covered_directions(&nodes).into_iter().collect();
/// assert_eq!(covered, vec![1]);
/// ```
#[must_use]
pub fn covered_directions<'a, I>(nodes: I) -> BTreeSet<usize>
where
    I: IntoIterator<Item = &'a ShiftVector>,
    I::IntoIter: Clone,
{
    let nodes = nodes.into_iter();
    let mut covered = BTreeSet::new();
    for (index, a) in nodes.clone().enumerate() {
        for b in nodes.clone().skip(index + 1) {
            if let Some(axis) = a.unit_step_axis(b) {
                covered.insert(axis);
            }
        }
    }
    covered
}

/// Basis indices in `0..dim` that are neither covered nor eliminated,
/// ascending.
#[must_use]
pub fn missing_directions<'a, I>(nodes: I, dim: usize, eliminate: Option<usize>) -> Vec<usize>
where
    I: IntoIterator<Item = &'a ShiftVector>,
    I::IntoIter: Clone,
{
    let covered = covered_directions(nodes);
    (0..dim)
        .filter(|axis| Some(*axis) != eliminate && !covered.contains(axis))
        .collect()
}

/// Exact rank over the rationals of the node vectors, with the `eliminate`
/// coordinate dropped first.
///
/// Elimination runs over arbitrary-precision rationals, so any `i64`
/// coordinates are accepted.
///
/// # Examples
/// ```
/// use looptopo_core::{ShiftVector, rank};
///
/// let nodes = [
///     ShiftVector::new(vec![0, 0, 0]),
///     ShiftVector::new(vec![1, 0, 1]),
///     ShiftVector::new(vec![2, 0, 2]),
///     ShiftVector::new(vec![0, 1, 0]),
/// ];
/// assert_eq!(rank(&nodes, None), 2);
/// assert_eq!(rank(&nodes, Some(0)), 2);
/// assert_eq!(rank(&nodes, Some(1)), 1);
/// ```
#[must_use]
pub fn rank<'a, I>(nodes: I, eliminate: Option<usize>) -> usize
where
    I: IntoIterator<Item = &'a ShiftVector>,
{
    let mut rows: Vec<Vec<BigRational>> = nodes
        .into_iter()
        .map(|node| {
            node.without_axis(eliminate)
                .into_iter()
                .map(|value| BigRational::from_integer(BigInt::from(value)))
                .collect()
        })
        .collect();
    let columns = rows.first().map_or(0, Vec::len);
    let mut pivots = 0;
    for column in 0..columns {
        let Some(offset) = rows
            .iter()
            .skip(pivots)
            .position(|row| row.get(column).is_some_and(|value| !value.is_zero()))
        else {
            continue;
        };
        rows.swap(pivots, pivots + offset);
        let pivot_row = rows.get(pivots).cloned().unwrap_or_default();
        let Some(pivot) = pivot_row.get(column) else {
            continue;
        };
        for row in rows.iter_mut().skip(pivots + 1) {
            let Some(factor) = row.get(column).map(|value| value / pivot) else {
                continue;
            };
            if factor.is_zero() {
                continue;
            }
            for (cell, pivot_cell) in row.iter_mut().zip(&pivot_row) {
                *cell -= &factor * pivot_cell;
            }
        }
        pivots += 1;
    }
    pivots
}

/// Number of nodes in `nodes` that are unit-step neighbours of `node`.
#[must_use]
pub fn neighbour_count<'a, I>(node: &ShiftVector, nodes: I) -> usize
where
    I: IntoIterator<Item = &'a ShiftVector>,
{
    nodes
        .into_iter()
        .filter(|other| node.is_adjacent(other))
        .count()
}

/// Largest absolute coordinate across `nodes`, never below one.
#[must_use]
pub fn magnitude_floor<'a, I>(nodes: I) -> u64
where
    I: IntoIterator<Item = &'a ShiftVector>,
{
    nodes
        .into_iter()
        .map(ShiftVector::max_abs)
        .max()
        .unwrap_or(0)
        .max(1)
}
