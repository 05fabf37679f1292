//! Propagator and topology value types.

use std::fmt;

use crate::expr::LinearExpr;

/// A single propagator: a momentum routing and an opaque mass label.
///
/// # Examples
/// ```
/// use looptopo_core::{LinearExpr, Propagator};
///
/// let prop = Propagator::new(LinearExpr::symbol("l"), LinearExpr::symbol("mt"));
/// assert_eq!(prop.to_string(), "{l, mt}");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Propagator {
    momentum: LinearExpr,
    mass: LinearExpr,
}

impl Propagator {
    /// Creates a propagator from its momentum and mass expressions.
    #[must_use]
    pub fn new(momentum: LinearExpr, mass: LinearExpr) -> Self {
        Self { momentum, mass }
    }

    /// The momentum flowing through the propagator.
    #[must_use]
    pub fn momentum(&self) -> &LinearExpr {
        &self.momentum
    }

    /// The mass label.
    #[must_use]
    pub fn mass(&self) -> &LinearExpr {
        &self.mass
    }

    /// Returns a copy with the momentum replaced.
    #[must_use]
    pub fn with_momentum(&self, momentum: LinearExpr) -> Self {
        Self {
            momentum,
            mass: self.mass.clone(),
        }
    }
}

impl fmt::Display for Propagator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {}}}", self.momentum, self.mass)
    }
}

/// A named, ordered list of propagators.
///
/// Order only matters for stable output; the extension engine appends to the
/// list and never reorders or removes entries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topology {
    name: String,
    propagators: Vec<Propagator>,
}

impl Topology {
    /// Creates a topology.
    #[must_use]
    pub fn new(name: impl Into<String>, propagators: Vec<Propagator>) -> Self {
        Self {
            name: name.into(),
            propagators,
        }
    }

    /// The record name (for example `top1`).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The propagators in insertion order.
    #[must_use]
    pub fn propagators(&self) -> &[Propagator] {
        &self.propagators
    }

    /// Number of propagators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.propagators.len()
    }

    /// Whether the topology has no propagators.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.propagators.is_empty()
    }

    pub(crate) fn push(&mut self, propagator: Propagator) {
        self.propagators.push(propagator);
    }

    /// Applies `f` to every propagator, keeping the name.
    #[must_use]
    pub fn map_propagators(&self, f: impl FnMut(&Propagator) -> Propagator) -> Self {
        Self {
            name: self.name.clone(),
            propagators: self.propagators.iter().map(f).collect(),
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (index, propagator) in self.propagators.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{propagator}")?;
        }
        f.write_str("}")
    }
}
