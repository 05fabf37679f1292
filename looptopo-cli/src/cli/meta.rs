//! Process metadata (`meta.json`) describing the external legs.

use std::{fs, path::Path};

use looptopo_core::{Basis, LoopTopoError, MomentumRoles};
use serde::Deserialize;
use tracing::{Span, field, instrument};

use super::commands::CliError;

const DEFAULT_LEGS_PER_SIDE: usize = 2;

/// Which side of the process a particle sits on.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Incoming particle.
    In,
    /// Outgoing particle.
    Out,
    /// Anything else; ignored when assigning roles.
    #[serde(other)]
    Other,
}

/// One external particle and the momentum symbol it carries.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Particle {
    /// Basis symbol such as `p3`.
    pub momentum: String,
    /// Side of the process.
    pub side: Side,
}

/// The subset of `meta.json` the extension driver reads.
///
/// Unknown keys are ignored so full process descriptions can be passed as-is.
///
/// # Examples
/// ```
/// use looptopo_cli::cli::ProcessMeta;
///
/// let meta: ProcessMeta = serde_json::from_str(r#"{"n_in": 2, "n_out": 3}"#)?;
/// assert_eq!(meta.legs(), Some(5));
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ProcessMeta {
    /// Number of incoming legs.
    #[serde(default = "default_legs_per_side")]
    pub n_in: usize,
    /// Number of outgoing legs.
    #[serde(default = "default_legs_per_side")]
    pub n_out: usize,
    /// External particles; may be empty.
    #[serde(default)]
    pub particles: Vec<Particle>,
}

const fn default_legs_per_side() -> usize {
    DEFAULT_LEGS_PER_SIDE
}

impl ProcessMeta {
    /// Total number of external legs, `None` when the sum overflows.
    #[must_use]
    pub const fn legs(&self) -> Option<usize> {
        self.n_in.checked_add(self.n_out)
    }

    /// Momentum roles over `basis`.
    ///
    /// Particles are matched to basis symbols by name. Without particles the
    /// first `n_in` basis momenta are incoming and the rest outgoing.
    ///
    /// # Errors
    /// Returns [`LoopTopoError::OverlappingRoles`] when one momentum is listed
    /// on both sides.
    pub fn roles(&self, basis: &Basis) -> Result<MomentumRoles, LoopTopoError> {
        if self.particles.is_empty() {
            return Ok(MomentumRoles::split(basis.len(), self.n_in));
        }
        let on_side = |side: Side| -> Vec<usize> {
            basis
                .symbols()
                .iter()
                .enumerate()
                .filter(|(_, symbol)| {
                    self.particles
                        .iter()
                        .any(|p| p.side == side && p.momentum == **symbol)
                })
                .map(|(index, _)| index)
                .collect()
        };
        MomentumRoles::new(on_side(Side::In), on_side(Side::Out), basis.len())
    }
}

#[instrument(name = "cli.load_meta", err, fields(path = field::Empty))]
pub(super) fn load_meta(path: &Path) -> Result<ProcessMeta, CliError> {
    Span::current().record("path", field::display(path.display()));
    let raw = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CliError::Meta {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    fn basis(n: usize) -> Basis {
        Basis::numbered("p", n).expect("basis")
    }

    #[test]
    fn missing_counts_default_to_two_by_two() {
        let meta: ProcessMeta = serde_json::from_str("{}").expect("meta");
        assert_eq!(meta.legs(), Some(4));
        let roles = meta.roles(&basis(4)).expect("roles");
        assert_eq!(roles.incoming(), &[0, 1]);
        assert_eq!(roles.outgoing(), &[2, 3]);
    }

    #[test]
    fn particles_assign_roles_by_symbol() {
        let meta: ProcessMeta = serde_json::from_str(
            r#"{
                "process": "q Q > t T g",
                "n_in": 2,
                "n_out": 3,
                "particles": [
                    {"name": "q", "momentum": "p1", "side": "in"},
                    {"name": "t", "momentum": "p3", "side": "out"},
                    {"name": "Q", "momentum": "p2", "side": "in"},
                    {"name": "g", "momentum": "p5", "side": "out"},
                    {"name": "T", "momentum": "p4", "side": "out"},
                    {"name": "x", "momentum": "p9", "side": "virtual"}
                ]
            }"#,
        )
        .expect("meta");
        let roles = meta.roles(&basis(meta.legs().expect("legs"))).expect("roles");
        assert_eq!(roles.incoming(), &[0, 1]);
        assert_eq!(roles.outgoing(), &[2, 3, 4]);
    }

    #[test]
    fn leg_count_overflow_is_none() {
        let meta: ProcessMeta =
            serde_json::from_str(&format!(r#"{{"n_in": {}, "n_out": 1}}"#, usize::MAX))
                .expect("meta");
        assert_eq!(meta.legs(), None);
    }

    #[rstest]
    #[case::both_sides(r#"[{"momentum": "p1", "side": "in"}, {"momentum": "p1", "side": "out"}]"#)]
    fn conflicting_particles_are_rejected(#[case] particles: &str) {
        let meta: ProcessMeta =
            serde_json::from_str(&format!(r#"{{"particles": {particles}}}"#)).expect("meta");
        let err = meta.roles(&basis(4)).expect_err("roles must conflict");
        assert_eq!(err.code().as_str(), "LOOPTOPO_OVERLAPPING_ROLES");
    }
}
