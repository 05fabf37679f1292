//! Linear expressions over named symbols.
//!
//! Momenta and masses only ever need linear combinations of symbols, so an
//! expression is stored as a map from symbol to exact rational coefficient
//! plus a constant term. Zero coefficients are never stored, which makes
//! structural equality coincide with algebraic equality.

use std::{
    collections::BTreeMap,
    fmt,
    ops::{Add, Neg, Sub},
};

use num_rational::Rational64;
use num_traits::{CheckedAdd, CheckedMul, One, Signed, Zero};

/// Exact coefficient type used by [`LinearExpr`].
pub type Coefficient = Rational64;

/// A linear combination `Σ cᵢ·sᵢ + c₀` with rational coefficients.
///
/// The operator impls panic when a coefficient leaves the `i64` range; the
/// `checked_*` methods report that as `None` instead and are what the
/// parser uses.
///
/// # Examples
/// ```
/// use looptopo_core::LinearExpr;
/// use num_rational::Rational64;
///
/// let q = LinearExpr::symbol("l") - LinearExpr::symbol("p1") + LinearExpr::symbol("p3");
/// assert_eq!(q.to_string(), "l - p1 + p3");
/// assert_eq!(q.coefficient("p1"), Rational64::from_integer(-1));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct LinearExpr {
    terms: BTreeMap<String, Coefficient>,
    constant: Coefficient,
}

impl LinearExpr {
    /// The zero expression.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// A constant expression.
    #[must_use]
    pub fn constant(value: impl Into<Coefficient>) -> Self {
        Self {
            terms: BTreeMap::new(),
            constant: value.into(),
        }
    }

    /// A single symbol with unit coefficient.
    #[must_use]
    pub fn symbol(name: impl Into<String>) -> Self {
        Self::term(name, Coefficient::one())
    }

    /// A single symbol scaled by `coefficient`.
    #[must_use]
    pub fn term(name: impl Into<String>, coefficient: impl Into<Coefficient>) -> Self {
        let mut expr = Self::zero();
        expr.add_term(name.into(), coefficient.into());
        expr
    }

    /// Returns `true` when every coefficient and the constant vanish.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty() && self.constant.is_zero()
    }

    /// Returns the value of the expression when it contains no symbols.
    #[must_use]
    pub fn as_constant(&self) -> Option<Coefficient> {
        self.terms.is_empty().then_some(self.constant)
    }

    /// Coefficient of `name`, zero when the symbol is absent.
    #[must_use]
    pub fn coefficient(&self, name: &str) -> Coefficient {
        self.terms.get(name).copied().unwrap_or_else(Coefficient::zero)
    }

    /// The constant term.
    #[must_use]
    pub fn constant_term(&self) -> Coefficient {
        self.constant
    }

    /// Iterates over `(symbol, coefficient)` pairs in symbol order.
    pub fn terms(&self) -> impl Iterator<Item = (&str, Coefficient)> + '_ {
        self.terms.iter().map(|(name, coeff)| (name.as_str(), *coeff))
    }

    /// Multiplies every coefficient by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: Coefficient) -> Self {
        if factor.is_zero() {
            return Self::zero();
        }
        Self {
            terms: self
                .terms
                .iter()
                .map(|(name, coeff)| (name.clone(), *coeff * factor))
                .collect(),
            constant: self.constant * factor,
        }
    }

    /// [`Self::scaled`] that returns `None` when a coefficient overflows.
    ///
    /// # Examples
    /// ```
    /// use looptopo_core::LinearExpr;
    /// use num_rational::Rational64;
    ///
    /// let expr = LinearExpr::term("p1", i64::MAX);
    /// assert!(expr.checked_scaled(Rational64::from_integer(2)).is_none());
    /// assert_eq!(
    ///     expr.checked_scaled(Rational64::new(1, 2)),
    ///     Some(LinearExpr::term("p1", Rational64::new(i64::MAX, 2))),
    /// );
    /// ```
    #[must_use]
    pub fn checked_scaled(&self, factor: Coefficient) -> Option<Self> {
        if factor.is_zero() {
            return Some(Self::zero());
        }
        let terms = self
            .terms
            .iter()
            .map(|(name, coeff)| Some((name.clone(), in_range(coeff.checked_mul(&factor))?)))
            .collect::<Option<BTreeMap<_, _>>>()?;
        let constant = in_range(self.constant.checked_mul(&factor))?;
        Some(Self { terms, constant })
    }

    /// [`Add`] that returns `None` when a coefficient overflows.
    #[must_use]
    pub fn checked_add(&self, rhs: &Self) -> Option<Self> {
        let mut out = self.clone();
        for (name, coeff) in &rhs.terms {
            let current = out.coefficient(name);
            let sum = in_range(current.checked_add(coeff))?;
            out.terms.insert(name.clone(), sum);
        }
        out.terms.retain(|_, value| !value.is_zero());
        out.constant = in_range(out.constant.checked_add(&rhs.constant))?;
        Some(out)
    }

    /// [`Sub`] that returns `None` when a coefficient overflows.
    #[must_use]
    pub fn checked_sub(&self, rhs: &Self) -> Option<Self> {
        self.checked_add(&rhs.checked_neg()?)
    }

    /// [`Neg`] that returns `None` when a coefficient overflows.
    #[must_use]
    pub fn checked_neg(&self) -> Option<Self> {
        self.checked_scaled(-Coefficient::one())
    }

    /// Replaces every occurrence of `name` by `replacement` and re-expands.
    ///
    /// # Examples
    /// ```
    /// use looptopo_core::LinearExpr;
    ///
    /// let expr = LinearExpr::symbol("l") + LinearExpr::term("p4", 2_i64);
    /// let rule = LinearExpr::symbol("p1") - LinearExpr::symbol("p3");
    /// assert_eq!(expr.substitute("p4", &rule).to_string(), "l + 2*p1 - 2*p3");
    /// ```
    #[must_use]
    pub fn substitute(&self, name: &str, replacement: &Self) -> Self {
        let Some(coeff) = self.terms.get(name).copied() else {
            return self.clone();
        };
        let mut rest = self.clone();
        rest.terms.remove(name);
        rest + replacement.scaled(coeff)
    }

    fn add_term(&mut self, name: String, coeff: Coefficient) {
        if coeff.is_zero() {
            return;
        }
        let entry = self.terms.entry(name).or_insert_with(Coefficient::zero);
        *entry += coeff;
        if entry.is_zero() {
            self.terms.retain(|_, value| !value.is_zero());
        }
    }
}

/// Keeps `i64::MIN` numerators out so negation and `abs` stay total.
fn in_range(value: Option<Coefficient>) -> Option<Coefficient> {
    value.filter(|coeff| *coeff.numer() != i64::MIN)
}

impl From<i64> for LinearExpr {
    fn from(value: i64) -> Self {
        Self::constant(value)
    }
}

impl Add for LinearExpr {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        for (name, coeff) in rhs.terms {
            self.add_term(name, coeff);
        }
        self.constant += rhs.constant;
        self
    }
}

impl Sub for LinearExpr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl Neg for LinearExpr {
    type Output = Self;

    fn neg(self) -> Self {
        self.scaled(-Coefficient::one())
    }
}

impl std::iter::Sum for LinearExpr {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Add::add)
    }
}

impl fmt::Display for LinearExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }
        let mut first = true;
        for (name, coeff) in &self.terms {
            write_sign(f, coeff.is_negative(), first)?;
            let magnitude = coeff.abs();
            if magnitude.is_one() {
                f.write_str(name)?;
            } else {
                write!(f, "{magnitude}*{name}")?;
            }
            first = false;
        }
        if !self.constant.is_zero() {
            write_sign(f, self.constant.is_negative(), first)?;
            write!(f, "{}", self.constant.abs())?;
        }
        Ok(())
    }
}

fn write_sign(f: &mut fmt::Formatter<'_>, negative: bool, first: bool) -> fmt::Result {
    match (first, negative) {
        (true, true) => f.write_str("-"),
        (true, false) => Ok(()),
        (false, true) => f.write_str(" - "),
        (false, false) => f.write_str(" + "),
    }
}
