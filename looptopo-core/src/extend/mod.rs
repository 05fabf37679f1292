//! Topology extension engine.
//!
//! [`Extender::extend`] appends unit-step neighbours of existing propagators
//! until the topology reaches the target count and the node set reaches the
//! required rank. Each iteration asks the strategy chain for one candidate;
//! when the chain is empty the magnitude bound is relaxed a bounded number
//! of times. Running out of insertions or relaxations is a shortfall, not an
//! error: the partial topology is returned and a single warning is logged.

mod builder;
mod state;
mod strategy;

use std::{fmt, sync::Arc};

use thiserror::Error;
use tracing::{debug, instrument, warn};

pub use self::builder::ExtenderBuilder;
use self::{state::ExtensionState, strategy::propose};
use crate::{
    Result,
    expr::LinearExpr,
    lattice::{Lattice, ShiftVector},
    topology::Topology,
};

/// Why an extension stopped before meeting its targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShortfallReason {
    /// The insertion budget (`max_add`) ran out.
    InsertionBudget,
    /// No strategy found a candidate after every magnitude relaxation.
    MagnitudeCeiling,
}

impl ShortfallReason {
    /// Stable machine-readable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InsertionBudget => "insertion_budget",
            Self::MagnitudeCeiling => "magnitude_ceiling",
        }
    }
}

impl fmt::Display for ShortfallReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Description of an extension that stopped short of its targets.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error(
    "could not reach {target} propagators with rank {rank_needed} for `{topology}` \
     (stopped at {propagators} propagators, rank {rank}: {reason})"
)]
pub struct ExtensionShortfall {
    /// Name of the topology.
    pub topology: Arc<str>,
    /// Which limit was hit.
    pub reason: ShortfallReason,
    /// Propagator count reached.
    pub propagators: usize,
    /// Requested propagator count.
    pub target: usize,
    /// Rank reached.
    pub rank: usize,
    /// Requested rank.
    pub rank_needed: usize,
}

/// Final status of an extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExtensionStatus {
    /// Count and rank targets were both met.
    Complete,
    /// The engine stopped early; the topology is partial.
    Shortfall(ExtensionShortfall),
}

/// Result of one [`Extender::extend`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtensionOutcome {
    topology: Topology,
    inserted: Vec<ShiftVector>,
    max_coord: u64,
    rank: usize,
    status: ExtensionStatus,
}

impl ExtensionOutcome {
    /// The extended topology; inputs first, insertions appended in order.
    #[must_use]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Consumes the outcome, returning the topology.
    #[must_use]
    pub fn into_topology(self) -> Topology {
        self.topology
    }

    /// Number of propagators the engine appended.
    #[must_use]
    pub fn added(&self) -> usize {
        self.inserted.len()
    }

    /// Shift vectors of the appended propagators, in insertion order.
    #[must_use]
    pub fn inserted(&self) -> &[ShiftVector] {
        &self.inserted
    }

    /// Magnitude bound in force when the engine stopped.
    #[must_use]
    pub fn max_coord(&self) -> u64 {
        self.max_coord
    }

    /// Rank of the final node set (after projection).
    #[must_use]
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Completion status.
    #[must_use]
    pub fn status(&self) -> &ExtensionStatus {
        &self.status
    }

    /// Whether both targets were met.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self.status, ExtensionStatus::Complete)
    }

    /// The shortfall description, if any.
    #[must_use]
    pub fn shortfall(&self) -> Option<&ExtensionShortfall> {
        match &self.status {
            ExtensionStatus::Complete => None,
            ExtensionStatus::Shortfall(shortfall) => Some(shortfall),
        }
    }
}

/// Immutable extension engine; build one with [`ExtenderBuilder`].
///
/// The engine holds configuration only, so one instance can serve many
/// topologies concurrently.
///
/// # Examples
/// ```
/// use looptopo_core::{Basis, ExtenderBuilder, Lattice, parse_record};
///
/// let lattice = Lattice::new("l", Basis::numbered("p", 4)?)?;
/// let extender = ExtenderBuilder::new(lattice).build()?;
/// let topology = parse_record("top1: [[l, mt], [l - p1 - p2 + p3, 0], [l - p2, mt]]")?;
///
/// let outcome = extender.extend(&topology)?;
/// assert!(outcome.is_complete());
/// assert_eq!(outcome.topology().len(), 4);
/// assert_eq!(
///     outcome.topology().propagators()[3].momentum().to_string(),
///     "l - p2 + p3"
/// );
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Extender {
    lattice: Lattice,
    target: usize,
    rank_needed: usize,
    eliminate: Option<usize>,
    max_add: usize,
    default_mass: LinearExpr,
    relaxations: usize,
}

impl Extender {
    /// The lattice used to map momenta.
    #[must_use]
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Target propagator count.
    #[must_use]
    pub fn target(&self) -> usize {
        self.target
    }

    /// Required rank of the projected node set.
    #[must_use]
    pub fn rank_needed(&self) -> usize {
        self.rank_needed
    }

    /// Basis index projected out of rank and coverage checks.
    #[must_use]
    pub fn eliminate(&self) -> Option<usize> {
        self.eliminate
    }

    /// Insertion budget per topology.
    #[must_use]
    pub fn max_add(&self) -> usize {
        self.max_add
    }

    /// Mass given to inserted propagators.
    #[must_use]
    pub fn default_mass(&self) -> &LinearExpr {
        &self.default_mass
    }

    /// Magnitude relaxation budget.
    #[must_use]
    pub fn relaxations(&self) -> usize {
        self.relaxations
    }

    /// Extends `topology` until the count and rank targets are met or a
    /// limit is hit.
    ///
    /// # Errors
    /// Returns [`crate::LoopTopoError`] when a propagator cannot be mapped
    /// onto the lattice, when two propagators share a shift vector, or when
    /// the topology is empty. Shortfalls are reported on the outcome.
    #[instrument(
        name = "engine.extend",
        err,
        skip(self, topology),
        fields(
            topology = %topology.name(),
            propagators = topology.len(),
            target = self.target,
            rank_needed = self.rank_needed,
        ),
    )]
    pub fn extend(&self, topology: &Topology) -> Result<ExtensionOutcome> {
        let mut state = ExtensionState::seed(&self.lattice, topology)?;
        let dim = self.lattice.dim();
        loop {
            let rank = state.rank(self.eliminate);
            if state.len() >= self.target && rank >= self.rank_needed {
                debug!(
                    added = state.added(),
                    propagators = state.len(),
                    rank,
                    "extension complete"
                );
                return Ok(Self::finish(state, rank, ExtensionStatus::Complete));
            }
            if state.added() >= self.max_add {
                return Ok(self.shortfall(state, rank, ShortfallReason::InsertionBudget));
            }
            let missing = state.missing(dim, self.eliminate);
            let proposal = propose(&state.frontier(&missing, dim));
            match proposal {
                Some((strategy, vector)) => {
                    debug!(strategy, vector = %vector, "inserting propagator");
                    state.insert(vector, &self.lattice, &self.default_mass);
                }
                None if state.relaxations() < self.relaxations => {
                    state.relax();
                    debug!(max_coord = state.max_coord(), "relaxed magnitude bound");
                }
                None => {
                    return Ok(self.shortfall(state, rank, ShortfallReason::MagnitudeCeiling));
                }
            }
        }
    }

    fn shortfall(
        &self,
        state: ExtensionState,
        rank: usize,
        reason: ShortfallReason,
    ) -> ExtensionOutcome {
        let shortfall = ExtensionShortfall {
            topology: Arc::from(state.name()),
            reason,
            propagators: state.len(),
            target: self.target,
            rank,
            rank_needed: self.rank_needed,
        };
        warn!(
            topology = %shortfall.topology,
            reason = %shortfall.reason,
            propagators = shortfall.propagators,
            target = shortfall.target,
            rank = shortfall.rank,
            rank_needed = shortfall.rank_needed,
            "{shortfall}"
        );
        Self::finish(state, rank, ExtensionStatus::Shortfall(shortfall))
    }

    fn finish(state: ExtensionState, rank: usize, status: ExtensionStatus) -> ExtensionOutcome {
        let (topology, inserted, max_coord) = state.into_parts();
        ExtensionOutcome {
            topology,
            inserted,
            max_coord,
            rank,
            status,
        }
    }
}

#[cfg(test)]
mod property;
