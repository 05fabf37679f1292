//! Builder for configuring [`Extender`] instances.

use crate::{
    Result,
    error::LoopTopoError,
    expr::LinearExpr,
    extend::Extender,
    lattice::Lattice,
};

/// Configures and constructs [`Extender`] instances.
///
/// Defaults: the target count equals the basis size, no rank requirement, no
/// eliminated momentum, at most 50 insertions, massless insertions and three
/// magnitude relaxations.
///
/// # Examples
/// ```
/// use looptopo_core::{Basis, ExtenderBuilder, Lattice};
///
/// let lattice = Lattice::new("l", Basis::numbered("p", 4)?)?;
/// let extender = ExtenderBuilder::new(lattice)
///     .with_eliminate(Some(3))
///     .with_rank_needed(3)
///     .build()?;
/// assert_eq!(extender.target(), 4);
/// assert_eq!(extender.max_add(), 50);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct ExtenderBuilder {
    lattice: Lattice,
    target: Option<usize>,
    rank_needed: usize,
    eliminate: Option<usize>,
    max_add: usize,
    default_mass: LinearExpr,
    relaxations: usize,
}

impl ExtenderBuilder {
    /// Creates a builder for `lattice` populated with default parameters.
    #[must_use]
    pub fn new(lattice: Lattice) -> Self {
        Self {
            lattice,
            target: None,
            rank_needed: 0,
            eliminate: None,
            max_add: 50,
            default_mass: LinearExpr::zero(),
            relaxations: 3,
        }
    }

    /// Overrides the target propagator count.
    #[must_use]
    pub fn with_target(mut self, target: usize) -> Self {
        self.target = Some(target);
        self
    }

    /// Sets the rank the node set must reach.
    #[must_use]
    pub fn with_rank_needed(mut self, rank_needed: usize) -> Self {
        self.rank_needed = rank_needed;
        self
    }

    /// Selects the zero-based basis index projected out of the rank and
    /// coverage checks.
    #[must_use]
    pub fn with_eliminate(mut self, eliminate: Option<usize>) -> Self {
        self.eliminate = eliminate;
        self
    }

    /// Caps the number of insertions per topology.
    #[must_use]
    pub fn with_max_add(mut self, max_add: usize) -> Self {
        self.max_add = max_add;
        self
    }

    /// Mass label given to inserted propagators.
    #[must_use]
    pub fn with_default_mass(mut self, mass: LinearExpr) -> Self {
        self.default_mass = mass;
        self
    }

    /// Number of times the magnitude bound may be raised before giving up.
    #[must_use]
    pub fn with_relaxations(mut self, relaxations: usize) -> Self {
        self.relaxations = relaxations;
        self
    }

    /// Returns the configured target, defaulting to the basis size.
    #[must_use]
    pub fn target(&self) -> usize {
        self.target.unwrap_or_else(|| self.lattice.dim())
    }

    /// Returns the configured rank requirement.
    #[must_use]
    pub fn rank_needed(&self) -> usize {
        self.rank_needed
    }

    /// Validates the configuration and constructs an [`Extender`].
    ///
    /// # Errors
    /// Returns [`LoopTopoError::InvalidEliminateIndex`] when the eliminate
    /// index lies outside the basis and [`LoopTopoError::UnreachableRank`]
    /// when the rank requirement exceeds the projected dimension.
    pub fn build(self) -> Result<Extender> {
        let dim = self.lattice.dim();
        if let Some(index) = self.eliminate
            && index >= dim
        {
            return Err(LoopTopoError::InvalidEliminateIndex {
                index,
                basis_len: dim,
            });
        }
        let max_rank = dim - usize::from(self.eliminate.is_some());
        if self.rank_needed > max_rank {
            return Err(LoopTopoError::UnreachableRank {
                rank_needed: self.rank_needed,
                max_rank,
            });
        }
        let target = self.target();
        Ok(Extender {
            lattice: self.lattice,
            target,
            rank_needed: self.rank_needed,
            eliminate: self.eliminate,
            max_add: self.max_add,
            default_mass: self.default_mass,
            relaxations: self.relaxations,
        })
    }
}
