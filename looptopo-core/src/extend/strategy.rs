//! Candidate-generating strategies tried in fixed priority order.
//!
//! Every strategy proposes at most one new lattice point reached by a single
//! unit step from an existing node. Candidates must be absent from the node
//! set and respect the current magnitude bound; [`Frontier::admits`] is the
//! single gate for both conditions.

use std::{
    cmp::{Ordering, Reverse},
    collections::BTreeSet,
};

use crate::{analysis::neighbour_count, lattice::ShiftVector};

/// Read-only view of the search state handed to each strategy.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Frontier<'a> {
    nodes: &'a BTreeSet<ShiftVector>,
    missing: &'a [usize],
    max_coord: u64,
    dim: usize,
}

impl<'a> Frontier<'a> {
    pub(crate) fn new(
        nodes: &'a BTreeSet<ShiftVector>,
        missing: &'a [usize],
        max_coord: u64,
        dim: usize,
    ) -> Self {
        Self {
            nodes,
            missing,
            max_coord,
            dim,
        }
    }

    /// Whether `candidate` is new and within the magnitude bound.
    pub(crate) fn admits(&self, candidate: &ShiftVector) -> bool {
        candidate.max_abs() <= self.max_coord && !self.nodes.contains(candidate)
    }

    fn is_missing(&self, axis: usize) -> bool {
        self.missing.contains(&axis)
    }

    /// Node pairs at distance greater than one, farthest first, ties in
    /// lexicographic pair order.
    fn gapped_pairs(&self) -> Vec<(&'a ShiftVector, &'a ShiftVector, u64)> {
        let nodes: Vec<&ShiftVector> = self.nodes.iter().collect();
        let mut pairs = Vec::new();
        for (index, a) in nodes.iter().enumerate() {
            for b in nodes.iter().skip(index + 1) {
                let distance = a.manhattan(b);
                if distance > 1 {
                    pairs.push((*a, *b, distance));
                }
            }
        }
        pairs.sort_by_key(|(_, _, distance)| Reverse(*distance));
        pairs
    }

    /// Nodes by ascending neighbour count, ties lexicographic.
    fn endpoints_by_degree(&self) -> Vec<&'a ShiftVector> {
        let mut ranked: Vec<(usize, &ShiftVector)> = self
            .nodes
            .iter()
            .map(|node| (neighbour_count(node, self.nodes), node))
            .collect();
        ranked.sort_by_key(|(degree, _)| *degree);
        ranked.into_iter().map(|(_, node)| node).collect()
    }

    /// First admissible unit step from `from` toward `to` along `axes`.
    fn step_toward(
        &self,
        from: &ShiftVector,
        to: &ShiftVector,
        axes: impl IntoIterator<Item = usize>,
    ) -> Option<ShiftVector> {
        axes.into_iter().find_map(|axis| {
            let delta = match to.coords().get(axis)?.cmp(from.coords().get(axis)?) {
                Ordering::Greater => 1,
                Ordering::Less => -1,
                Ordering::Equal => return None,
            };
            from.stepped(axis, delta)
                .filter(|candidate| self.admits(candidate))
        })
    }

    /// First admissible `-1` then `+1` step along `axes` from any endpoint.
    fn inject(&self, axes: &[usize]) -> Option<ShiftVector> {
        self.endpoints_by_degree().into_iter().find_map(|node| {
            axes.iter().find_map(|&axis| {
                [-1, 1]
                    .into_iter()
                    .filter_map(|delta| node.stepped(axis, delta))
                    .find(|candidate| self.admits(candidate))
            })
        })
    }
}

/// A single heuristic in the insertion chain.
pub(crate) trait CandidateStrategy: Sync {
    /// Stable name recorded on insertion events.
    fn name(&self) -> &'static str;

    /// Proposes the next node, or `None` when the heuristic has nothing to
    /// offer at the current bound.
    fn propose(&self, frontier: &Frontier<'_>) -> Option<ShiftVector>;
}

/// Bridges distant pairs whose separation touches a missing direction,
/// stepping along missing axes first.
pub(crate) struct MissingGapFill;

impl CandidateStrategy for MissingGapFill {
    fn name(&self) -> &'static str {
        "missing_gap_fill"
    }

    fn propose(&self, frontier: &Frontier<'_>) -> Option<ShiftVector> {
        if frontier.missing.is_empty() {
            return None;
        }
        frontier
            .gapped_pairs()
            .into_iter()
            .filter(|(a, b, _)| a.differing_axes(b).any(|axis| frontier.is_missing(axis)))
            .find_map(|(a, b, _)| {
                let (preferred, rest): (Vec<usize>, Vec<usize>) =
                    a.differing_axes(b).partition(|axis| frontier.is_missing(*axis));
                let axes: Vec<usize> = preferred.into_iter().chain(rest).collect();
                frontier
                    .step_toward(a, b, axes.iter().copied())
                    .or_else(|| frontier.step_toward(b, a, axes.iter().copied()))
            })
    }
}

/// Opens a missing direction from the least connected node.
pub(crate) struct DirectionInjection;

impl CandidateStrategy for DirectionInjection {
    fn name(&self) -> &'static str {
        "direction_injection"
    }

    fn propose(&self, frontier: &Frontier<'_>) -> Option<ShiftVector> {
        if frontier.missing.is_empty() {
            return None;
        }
        frontier.inject(frontier.missing)
    }
}

/// Bridges any distant pair, lowest axis first.
pub(crate) struct GapFill;

impl CandidateStrategy for GapFill {
    fn name(&self) -> &'static str {
        "gap_fill"
    }

    fn propose(&self, frontier: &Frontier<'_>) -> Option<ShiftVector> {
        frontier.gapped_pairs().into_iter().find_map(|(a, b, _)| {
            frontier
                .step_toward(a, b, a.differing_axes(b))
                .or_else(|| frontier.step_toward(b, a, b.differing_axes(a)))
        })
    }
}

/// Grows the lattice from the least connected node along any axis.
pub(crate) struct EndpointExtension;

impl CandidateStrategy for EndpointExtension {
    fn name(&self) -> &'static str {
        "endpoint_extension"
    }

    fn propose(&self, frontier: &Frontier<'_>) -> Option<ShiftVector> {
        let axes: Vec<usize> = (0..frontier.dim).collect();
        frontier.inject(&axes)
    }
}

/// The insertion chain; the first strategy with a candidate wins.
pub(crate) const STRATEGY_CHAIN: [&dyn CandidateStrategy; 4] =
    [&MissingGapFill, &DirectionInjection, &GapFill, &EndpointExtension];

/// Runs the chain and reports which strategy produced the candidate.
pub(crate) fn propose(frontier: &Frontier<'_>) -> Option<(&'static str, ShiftVector)> {
    STRATEGY_CHAIN.iter().find_map(|strategy| {
        strategy
            .propose(frontier)
            .map(|candidate| (strategy.name(), candidate))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    use crate::analysis::missing_directions;

    fn node_set(raw: &[&[i64]]) -> BTreeSet<ShiftVector> {
        raw.iter().map(|coords| ShiftVector::new(coords.to_vec())).collect()
    }

    fn run(strategy: &dyn CandidateStrategy, raw: &[&[i64]], max_coord: u64) -> Option<Vec<i64>> {
        let nodes = node_set(raw);
        let dim = nodes.first().map_or(0, ShiftVector::dim);
        let missing = missing_directions(&nodes, dim, None);
        let frontier = Frontier::new(&nodes, &missing, max_coord, dim);
        strategy
            .propose(&frontier)
            .map(|candidate| candidate.coords().to_vec())
    }

    #[test]
    fn missing_gap_fill_bridges_along_a_missing_axis() {
        let raw: &[&[i64]] = &[&[0, 0, 0, 0], &[-1, -1, 1, 0], &[0, -1, 0, 0]];
        assert_eq!(run(&MissingGapFill, raw, 1), Some(vec![0, -1, 1, 0]));
    }

    #[test]
    fn missing_gap_fill_skips_pairs_outside_missing_axes() {
        let raw: &[&[i64]] = &[&[0, 0, 0], &[1, 0, 0], &[1, 1, 0], &[0, 1, 0]];
        assert_eq!(run(&MissingGapFill, raw, 1), None);
    }

    #[test]
    fn missing_gap_fill_falls_back_to_the_other_endpoint() {
        // Every step out of (-2, -2) breaks the bound, so the step starts at the origin.
        let nodes = node_set(&[&[-2, -2], &[0, 0]]);
        let missing = vec![1];
        let frontier = Frontier::new(&nodes, &missing, 1, 2);
        assert_eq!(
            MissingGapFill.propose(&frontier),
            Some(ShiftVector::new(vec![0, -1]))
        );
    }

    #[test]
    fn missing_gap_fill_moves_on_when_the_farthest_pair_is_blocked() {
        // Both ends of the (-2, -2)..(2, 2) pair are boxed in by existing nodes.
        let nodes = node_set(&[&[-2, -2], &[-2, -1], &[-1, -2], &[1, 2], &[2, 1], &[2, 2]]);
        let missing = vec![1];
        let frontier = Frontier::new(&nodes, &missing, 2, 2);
        assert_eq!(
            MissingGapFill.propose(&frontier),
            Some(ShiftVector::new(vec![1, 1]))
        );
    }

    #[test]
    fn direction_injection_prefers_low_degree_nodes() {
        let raw: &[&[i64]] = &[&[-1, -1, 0, 0], &[0, -1, 0, 0], &[0, 0, 0, 0]];
        assert_eq!(
            run(&DirectionInjection, raw, 1),
            Some(vec![-1, -1, -1, 0])
        );
    }

    #[test]
    fn direction_injection_tries_negative_step_first() {
        let raw: &[&[i64]] = &[&[0, 0]];
        assert_eq!(run(&DirectionInjection, raw, 1), Some(vec![-1, 0]));
    }

    #[rstest]
    #[case::respects_bound({ let rows: &[&[i64]] = &[&[0], &[1], &[-1]]; rows }, 1, None)]
    #[case::relaxed_bound({ let rows: &[&[i64]] = &[&[0], &[1], &[-1]]; rows }, 2, Some(vec![-2]))]
    fn endpoint_extension_honours_the_magnitude_bound(
        #[case] raw: &[&[i64]],
        #[case] max_coord: u64,
        #[case] expected: Option<Vec<i64>>,
    ) {
        assert_eq!(run(&EndpointExtension, raw, max_coord), expected);
    }

    #[test]
    fn gap_fill_uses_the_farthest_pair() {
        let raw: &[&[i64]] = &[&[0, 0], &[0, 2], &[3, 0]];
        assert_eq!(run(&GapFill, raw, 3), Some(vec![1, 2]));
    }

    #[test]
    fn chain_reports_the_winning_strategy() {
        let nodes = node_set(&[&[0, 0], &[1, 0]]);
        let missing = vec![1];
        let frontier = Frontier::new(&nodes, &missing, 1, 2);
        let (name, candidate) = propose(&frontier).expect("chain must find a candidate");
        assert_eq!(name, "direction_injection");
        assert_eq!(candidate.coords(), &[0, -1]);
    }
}
