//! Mapping between momentum expressions and integer shift vectors.
//!
//! A propagator momentum `l + Σ cᵢ·pᵢ` is represented by the vector `(cᵢ)`
//! over an ordered [`Basis`]. The engine works exclusively on these vectors
//! and only converts back to expressions when appending propagators.

use std::{collections::BTreeSet, fmt, sync::Arc};

use num_traits::{One, Zero};

use crate::{
    error::{LoopTopoError, Result},
    expr::LinearExpr,
};

/// Integer coordinates of a propagator relative to the loop momentum.
///
/// Vectors order lexicographically, which every tie-break in the engine
/// relies on.
///
/// # Examples
/// ```
/// use looptopo_core::ShiftVector;
///
/// let a = ShiftVector::new(vec![0, -1, 0, 0]);
/// let b = ShiftVector::new(vec![0, 0, 0, 0]);
/// assert_eq!(a.unit_step_axis(&b), Some(1));
/// assert_eq!(a.manhattan(&b), 1);
/// assert!(a < b);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShiftVector(Vec<i64>);

impl ShiftVector {
    /// Wraps the given coordinates.
    #[must_use]
    pub fn new(coords: Vec<i64>) -> Self {
        Self(coords)
    }

    /// The origin of a `dim`-dimensional lattice.
    #[must_use]
    pub fn zero(dim: usize) -> Self {
        Self(vec![0; dim])
    }

    /// The coordinates.
    #[must_use]
    pub fn coords(&self) -> &[i64] {
        &self.0
    }

    /// Number of coordinates.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    /// Largest absolute coordinate, `0` for the origin.
    #[must_use]
    pub fn max_abs(&self) -> u64 {
        self.0.iter().map(|c| c.unsigned_abs()).max().unwrap_or(0)
    }

    /// L1 distance to `other`.
    #[must_use]
    pub fn manhattan(&self, other: &Self) -> u64 {
        self.0
            .iter()
            .zip(&other.0)
            .fold(0_u64, |acc, (a, b)| acc.saturating_add(a.abs_diff(*b)))
    }

    /// Axes on which the two vectors disagree, ascending.
    pub fn differing_axes<'a>(&'a self, other: &'a Self) -> impl Iterator<Item = usize> + 'a {
        self.0
            .iter()
            .zip(&other.0)
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(axis, _)| axis)
    }

    /// The axis along which `self` and `other` are unit-step neighbours, if
    /// they differ by exactly one in exactly one coordinate.
    #[must_use]
    pub fn unit_step_axis(&self, other: &Self) -> Option<usize> {
        if self.dim() != other.dim() {
            return None;
        }
        let mut axes = self.differing_axes(other);
        let axis = axes.next()?;
        if axes.next().is_some() {
            return None;
        }
        let (a, b) = (self.0.get(axis)?, other.0.get(axis)?);
        (a.abs_diff(*b) == 1).then_some(axis)
    }

    /// Whether the vectors are unit-step neighbours.
    #[must_use]
    pub fn is_adjacent(&self, other: &Self) -> bool {
        self.unit_step_axis(other).is_some()
    }

    /// Returns a copy moved by `delta` along `axis`, or `None` when the axis
    /// is out of range or the coordinate would overflow.
    #[must_use]
    pub fn stepped(&self, axis: usize, delta: i64) -> Option<Self> {
        let mut coords = self.0.clone();
        let slot = coords.get_mut(axis)?;
        *slot = slot.checked_add(delta)?;
        Some(Self(coords))
    }

    /// Returns a copy with `axis` removed, used when a coordinate is
    /// projected out for rank computations.
    #[must_use]
    pub fn without_axis(&self, axis: Option<usize>) -> Vec<i64> {
        self.0
            .iter()
            .enumerate()
            .filter(|(index, _)| Some(*index) != axis)
            .map(|(_, value)| *value)
            .collect()
    }
}

impl fmt::Display for ShiftVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (index, value) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str(")")
    }
}

impl From<Vec<i64>> for ShiftVector {
    fn from(coords: Vec<i64>) -> Self {
        Self::new(coords)
    }
}

/// Ordered, duplicate-free list of external momentum symbols.
///
/// # Examples
/// ```
/// use looptopo_core::Basis;
///
/// let basis = Basis::numbered("p", 4).expect("non-empty basis");
/// assert_eq!(basis.symbol(3), Some("p4"));
/// assert_eq!(basis.index_of("p2"), Some(1));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Basis {
    symbols: Vec<String>,
}

impl Basis {
    /// Builds a basis from explicit symbols.
    ///
    /// # Errors
    /// Returns [`LoopTopoError::EmptyBasis`] for an empty list and
    /// [`LoopTopoError::DuplicateBasisSymbol`] when a symbol repeats.
    pub fn new<I, S>(symbols: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let symbols: Vec<String> = symbols.into_iter().map(Into::into).collect();
        if symbols.is_empty() {
            return Err(LoopTopoError::EmptyBasis);
        }
        let mut seen = BTreeSet::new();
        for symbol in &symbols {
            if !seen.insert(symbol.as_str()) {
                return Err(LoopTopoError::DuplicateBasisSymbol {
                    symbol: Arc::from(symbol.as_str()),
                });
            }
        }
        Ok(Self { symbols })
    }

    /// Builds `prefix1, ..., prefixN`.
    ///
    /// # Errors
    /// Returns [`LoopTopoError::EmptyBasis`] when `count` is zero.
    pub fn numbered(prefix: &str, count: usize) -> Result<Self> {
        Self::new((1..=count).map(|index| format!("{prefix}{index}")))
    }

    /// Number of basis symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always `false`; a constructed basis is never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// The symbol at `index`.
    #[must_use]
    pub fn symbol(&self, index: usize) -> Option<&str> {
        self.symbols.get(index).map(String::as_str)
    }

    /// All symbols in basis order.
    #[must_use]
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Position of `symbol`, if present.
    #[must_use]
    pub fn index_of(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|candidate| candidate == symbol)
    }
}

/// Subtracts the loop momentum from `momentum`.
///
/// # Errors
/// Returns [`LoopTopoError::LoopCoefficient`] unless `loop_symbol` appears
/// with coefficient exactly one.
///
/// # Examples
/// ```
/// use looptopo_core::{parse_expression, shift_of};
///
/// let momentum = parse_expression("l - p2 + p3").expect("valid expression");
/// let shift = shift_of(&momentum, "l").expect("unit loop coefficient");
/// assert_eq!(shift.to_string(), "-p2 + p3");
/// ```
pub fn shift_of(momentum: &LinearExpr, loop_symbol: &str) -> Result<LinearExpr> {
    let coefficient = momentum.coefficient(loop_symbol);
    if !coefficient.is_one() {
        return Err(LoopTopoError::LoopCoefficient {
            coefficient: Arc::from(coefficient.to_string()),
            expression: Arc::from(momentum.to_string()),
        });
    }
    Ok(momentum.clone() - LinearExpr::symbol(loop_symbol))
}

/// Extracts one integer coefficient per basis symbol from `shift`.
///
/// # Errors
/// Returns [`LoopTopoError::ForeignSymbol`] for symbols outside the basis,
/// [`LoopTopoError::NonIntegerCoefficient`] for fractional coefficients and
/// [`LoopTopoError::ConstantShift`] when a constant term survives.
pub fn vector_of(shift: &LinearExpr, basis: &Basis) -> Result<ShiftVector> {
    if !shift.constant_term().is_zero() {
        return Err(LoopTopoError::ConstantShift {
            expression: Arc::from(shift.to_string()),
        });
    }
    let mut coords = vec![0_i64; basis.len()];
    for (symbol, coefficient) in shift.terms() {
        let index = basis
            .index_of(symbol)
            .ok_or_else(|| LoopTopoError::ForeignSymbol {
                symbol: Arc::from(symbol),
                expression: Arc::from(shift.to_string()),
            })?;
        if !coefficient.is_integer() {
            return Err(LoopTopoError::NonIntegerCoefficient {
                symbol: Arc::from(symbol),
                coefficient: Arc::from(coefficient.to_string()),
                expression: Arc::from(shift.to_string()),
            });
        }
        if let Some(slot) = coords.get_mut(index) {
            *slot = coefficient.to_integer();
        }
    }
    Ok(ShiftVector::new(coords))
}

/// Rebuilds `loop_symbol + Σ vector[i]·basis[i]`.
///
/// # Examples
/// ```
/// use looptopo_core::{Basis, ShiftVector, vector_to_expr};
///
/// let basis = Basis::numbered("p", 4).expect("non-empty basis");
/// let expr = vector_to_expr(&ShiftVector::new(vec![0, -1, 1, 0]), &basis, "l");
/// assert_eq!(expr.to_string(), "l - p2 + p3");
/// ```
#[must_use]
pub fn vector_to_expr(vector: &ShiftVector, basis: &Basis, loop_symbol: &str) -> LinearExpr {
    basis
        .symbols()
        .iter()
        .zip(vector.coords())
        .map(|(symbol, coefficient)| LinearExpr::term(symbol.as_str(), *coefficient))
        .fold(LinearExpr::symbol(loop_symbol), |acc, term| acc + term)
}

/// A basis together with the loop momentum symbol.
///
/// # Examples
/// ```
/// use looptopo_core::{Basis, Lattice, parse_expression};
///
/// let lattice = Lattice::new("l", Basis::numbered("p", 4)?)?;
/// let momentum = parse_expression("l - p1 - p2 + p3")?;
/// let vector = lattice.vector_of_momentum(&momentum)?;
/// assert_eq!(vector.coords(), &[-1, -1, 1, 0]);
/// assert_eq!(lattice.vector_to_expr(&vector), momentum);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lattice {
    loop_symbol: String,
    basis: Basis,
}

impl Lattice {
    /// Pairs a loop symbol with a basis.
    ///
    /// # Errors
    /// Returns [`LoopTopoError::LoopSymbolInBasis`] when the loop symbol is
    /// also listed as an external momentum.
    pub fn new(loop_symbol: impl Into<String>, basis: Basis) -> Result<Self> {
        let loop_symbol = loop_symbol.into();
        if basis.index_of(&loop_symbol).is_some() {
            return Err(LoopTopoError::LoopSymbolInBasis {
                symbol: Arc::from(loop_symbol),
            });
        }
        Ok(Self { loop_symbol, basis })
    }

    /// The loop momentum symbol.
    #[must_use]
    pub fn loop_symbol(&self) -> &str {
        &self.loop_symbol
    }

    /// The external momentum basis.
    #[must_use]
    pub fn basis(&self) -> &Basis {
        &self.basis
    }

    /// Lattice dimension, equal to the basis size.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.basis.len()
    }

    /// See [`shift_of`].
    ///
    /// # Errors
    /// Propagates [`shift_of`] failures.
    pub fn shift_of(&self, momentum: &LinearExpr) -> Result<LinearExpr> {
        shift_of(momentum, &self.loop_symbol)
    }

    /// See [`vector_of`].
    ///
    /// # Errors
    /// Propagates [`vector_of`] failures.
    pub fn vector_of(&self, shift: &LinearExpr) -> Result<ShiftVector> {
        vector_of(shift, &self.basis)
    }

    /// Maps a full momentum to its shift vector.
    ///
    /// # Errors
    /// Propagates [`shift_of`] and [`vector_of`] failures.
    pub fn vector_of_momentum(&self, momentum: &LinearExpr) -> Result<ShiftVector> {
        self.vector_of(&self.shift_of(momentum)?)
    }

    /// See [`vector_to_expr`].
    #[must_use]
    pub fn vector_to_expr(&self, vector: &ShiftVector) -> LinearExpr {
        vector_to_expr(vector, &self.basis, &self.loop_symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use num_rational::Rational64;
    use rstest::{fixture, rstest};

    use crate::parser::parse_expression;

    #[fixture]
    fn lattice() -> Lattice {
        let basis = Basis::numbered("p", 4).expect("basis must build");
        Lattice::new("l", basis).expect("lattice must build")
    }

    fn expr(raw: &str) -> LinearExpr {
        parse_expression(raw).expect("expression must parse")
    }

    #[rstest]
    #[case::loop_only("l", vec![0, 0, 0, 0])]
    #[case::single("l - p2", vec![0, -1, 0, 0])]
    #[case::mixed("l - p1 - p2 + p3", vec![-1, -1, 1, 0])]
    #[case::scaled("l + 2p4 - 3p1", vec![-3, 0, 0, 2])]
    #[case::fraction_cancels("l + p1/2 + p1/2", vec![1, 0, 0, 0])]
    fn vector_of_momentum_extracts_coefficients(
        lattice: Lattice,
        #[case] raw: &str,
        #[case] coords: Vec<i64>,
    ) {
        let vector = lattice
            .vector_of_momentum(&expr(raw))
            .expect("momentum must map");
        assert_eq!(vector.coords(), coords.as_slice());
    }

    #[rstest]
    #[case::half("l + p1/2", "LOOPTOPO_NON_INTEGER_COEFFICIENT")]
    #[case::foreign("l + q1", "LOOPTOPO_FOREIGN_SYMBOL")]
    #[case::constant("l + 1", "LOOPTOPO_CONSTANT_SHIFT")]
    #[case::no_loop("p1", "LOOPTOPO_LOOP_COEFFICIENT")]
    #[case::double_loop("2l + p1", "LOOPTOPO_LOOP_COEFFICIENT")]
    #[case::reversed_loop("-l + p1", "LOOPTOPO_LOOP_COEFFICIENT")]
    fn vector_of_momentum_rejects_malformed_shifts(
        lattice: Lattice,
        #[case] raw: &str,
        #[case] code: &str,
    ) {
        let err = lattice
            .vector_of_momentum(&expr(raw))
            .expect_err("shift must be rejected");
        assert_eq!(err.code().as_str(), code);
    }

    #[rstest]
    fn vector_to_expr_inverts_vector_of(lattice: Lattice) {
        let momentum = expr("l + 2p1 - p3 + p4");
        let vector = lattice.vector_of_momentum(&momentum).expect("must map");
        assert_eq!(lattice.vector_to_expr(&vector), momentum);
    }

    #[test]
    fn vector_of_reports_the_fractional_coefficient() {
        let basis = Basis::numbered("p", 2).expect("basis must build");
        let shift = LinearExpr::term("p2", Rational64::new(3, 2));
        match vector_of(&shift, &basis) {
            Err(LoopTopoError::NonIntegerCoefficient {
                symbol,
                coefficient,
                ..
            }) => {
                assert_eq!(&*symbol, "p2");
                assert_eq!(&*coefficient, "3/2");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[rstest]
    #[case::empty(Vec::<&str>::new(), "LOOPTOPO_EMPTY_BASIS")]
    #[case::duplicate(vec!["p1", "p2", "p1"], "LOOPTOPO_DUPLICATE_BASIS_SYMBOL")]
    fn basis_new_validates_symbols(#[case] symbols: Vec<&str>, #[case] code: &str) {
        let err = Basis::new(symbols).expect_err("basis must be rejected");
        assert_eq!(err.code().as_str(), code);
    }

    #[test]
    fn lattice_rejects_loop_symbol_in_basis() {
        let basis = Basis::new(["l", "p1"]).expect("basis must build");
        let err = Lattice::new("l", basis).expect_err("loop symbol clash");
        assert_eq!(err.code().as_str(), "LOOPTOPO_LOOP_SYMBOL_IN_BASIS");
    }

    #[rstest]
    #[case::axis_neighbour(vec![0, 0, 0], vec![0, 1, 0], Some(1))]
    #[case::negative_step(vec![0, 0, 0], vec![-1, 0, 0], Some(0))]
    #[case::two_units(vec![0, 0, 0], vec![0, 2, 0], None)]
    #[case::diagonal(vec![0, 0, 0], vec![1, 1, 0], None)]
    #[case::identical(vec![1, 0, 0], vec![1, 0, 0], None)]
    fn unit_step_axis_detects_single_unit_differences(
        #[case] a: Vec<i64>,
        #[case] b: Vec<i64>,
        #[case] expected: Option<usize>,
    ) {
        assert_eq!(
            ShiftVector::new(a).unit_step_axis(&ShiftVector::new(b)),
            expected
        );
    }

    #[test]
    fn stepped_refuses_overflow_and_bad_axes() {
        let v = ShiftVector::new(vec![i64::MAX, 0]);
        assert_eq!(v.stepped(0, 1), None);
        assert_eq!(v.stepped(2, 1), None);
        assert_eq!(
            v.stepped(1, -1).map(|s| s.coords().to_vec()),
            Some(vec![i64::MAX, -1])
        );
    }

    #[test]
    fn max_abs_handles_extreme_values() {
        assert_eq!(ShiftVector::new(vec![i64::MIN, 3]).max_abs(), 1_u64 << 63);
        assert_eq!(ShiftVector::zero(3).max_abs(), 0);
    }
}
