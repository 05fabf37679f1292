//! Output-time momentum elimination and serialization.
//!
//! Elimination rewrites one basis momentum through overall momentum
//! conservation (`Σ incoming = Σ outgoing`). It never runs during the search;
//! the engine only uses the eliminate index to project its rank checks.

use std::{collections::BTreeSet, fmt::Write as _};

use crate::{
    error::{LoopTopoError, Result},
    expr::LinearExpr,
    lattice::Basis,
    topology::Topology,
};

/// Header line written before the serialized assignment.
pub const OUTPUT_HEADER: &str = "(* Auto-generated by looptopo *)";

/// Default name of the serialized list.
pub const DEFAULT_VAR_NAME: &str = "Extended";

/// Which basis momenta flow in and which flow out.
///
/// # Examples
/// ```
/// use looptopo_core::MomentumRoles;
///
/// let roles = MomentumRoles::split(4, 2);
/// assert_eq!(roles.incoming(), &[0, 1]);
/// assert_eq!(roles.outgoing(), &[2, 3]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MomentumRoles {
    incoming: Vec<usize>,
    outgoing: Vec<usize>,
}

impl MomentumRoles {
    /// Builds roles from explicit zero-based index lists.
    ///
    /// # Errors
    /// Returns [`LoopTopoError::InvalidRoleIndex`] for an index outside the
    /// basis and [`LoopTopoError::OverlappingRoles`] when an index appears in
    /// both lists.
    pub fn new(incoming: Vec<usize>, outgoing: Vec<usize>, basis_len: usize) -> Result<Self> {
        if let Some(&index) = incoming
            .iter()
            .chain(&outgoing)
            .find(|index| **index >= basis_len)
        {
            return Err(LoopTopoError::InvalidRoleIndex { index, basis_len });
        }
        let incoming_set: BTreeSet<usize> = incoming.iter().copied().collect();
        if let Some(&index) = outgoing.iter().find(|index| incoming_set.contains(index)) {
            return Err(LoopTopoError::OverlappingRoles { index });
        }
        Ok(Self { incoming, outgoing })
    }

    /// The first `incoming` indices flow in, the rest flow out.
    #[must_use]
    pub fn split(basis_len: usize, incoming: usize) -> Self {
        let cut = incoming.min(basis_len);
        Self {
            incoming: (0..cut).collect(),
            outgoing: (cut..basis_len).collect(),
        }
    }

    /// Incoming basis indices.
    #[must_use]
    pub fn incoming(&self) -> &[usize] {
        &self.incoming
    }

    /// Outgoing basis indices.
    #[must_use]
    pub fn outgoing(&self) -> &[usize] {
        &self.outgoing
    }

    /// The expression that replaces basis momentum `index`, or `None` when
    /// the index has no role.
    #[must_use]
    pub fn conservation_rule(&self, basis: &Basis, index: usize) -> Option<LinearExpr> {
        let eliminated = LinearExpr::symbol(basis.symbol(index)?);
        let sum = |indices: &[usize]| -> LinearExpr {
            indices
                .iter()
                .filter_map(|i| basis.symbol(*i))
                .map(LinearExpr::symbol)
                .sum()
        };
        if self.outgoing.contains(&index) {
            Some(sum(&self.incoming) - (sum(&self.outgoing) - eliminated))
        } else if self.incoming.contains(&index) {
            Some(sum(&self.outgoing) - (sum(&self.incoming) - eliminated))
        } else {
            None
        }
    }
}

/// Rewrites basis momentum `eliminate` in `expr` through momentum
/// conservation. Returns `expr` unchanged when no index is given or the index
/// has no role.
///
/// # Examples
/// ```
/// use looptopo_core::{Basis, MomentumRoles, eliminate_momentum, parse_expression};
///
/// let basis = Basis::numbered("p", 4)?;
/// let roles = MomentumRoles::split(4, 2);
/// let expr = parse_expression("l + p4")?;
/// let out = eliminate_momentum(&expr, &basis, Some(3), &roles);
/// assert_eq!(out.to_string(), "l + p1 + p2 - p3");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[must_use]
pub fn eliminate_momentum(
    expr: &LinearExpr,
    basis: &Basis,
    eliminate: Option<usize>,
    roles: &MomentumRoles,
) -> LinearExpr {
    let Some(index) = eliminate else {
        return expr.clone();
    };
    match (basis.symbol(index), roles.conservation_rule(basis, index)) {
        (Some(symbol), Some(rule)) => expr.substitute(symbol, &rule),
        _ => expr.clone(),
    }
}

/// Renders `topologies` as a single named list assignment.
///
/// # Examples
/// ```
/// use looptopo_core::{parse_record, serialize};
///
/// let topo = parse_record("t: [[l, mt], [l - p2, 0]]")?;
/// let text = serialize(&[topo], "Extended");
/// assert_eq!(
///     text,
///     "(* Auto-generated by looptopo *)\nExtended = {\n  {{l, mt}, {l - p2, 0}}\n};\n"
/// );
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[must_use]
pub fn serialize(topologies: &[Topology], var_name: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{OUTPUT_HEADER}");
    let _ = writeln!(out, "{var_name} = {{");
    let rows: Vec<String> = topologies
        .iter()
        .map(|topology| format!("  {topology}"))
        .collect();
    out.push_str(&rows.join(",\n"));
    out.push_str("\n};\n");
    out
}

/// Applies elimination to every momentum and serializes the result.
///
/// # Examples
/// ```
/// use looptopo_core::{Basis, MomentumRoles, OutputFormatter, parse_record};
///
/// let formatter = OutputFormatter::new(Basis::numbered("p", 4)?)
///     .with_eliminate(Some(3))
///     .with_roles(MomentumRoles::split(4, 2));
/// let topo = parse_record("t: [[l, 0], [l - p4, mt]]")?;
/// assert!(formatter.render(&[topo]).contains("{l - p1 - p2 + p3, mt}"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct OutputFormatter {
    basis: Basis,
    eliminate: Option<usize>,
    roles: MomentumRoles,
    var_name: String,
}

impl OutputFormatter {
    /// A formatter with no elimination and the default variable name.
    #[must_use]
    pub fn new(basis: Basis) -> Self {
        Self {
            basis,
            eliminate: None,
            roles: MomentumRoles::default(),
            var_name: DEFAULT_VAR_NAME.to_owned(),
        }
    }

    /// Selects the zero-based basis index to eliminate.
    #[must_use]
    pub fn with_eliminate(mut self, eliminate: Option<usize>) -> Self {
        self.eliminate = eliminate;
        self
    }

    /// Sets the momentum roles used by the conservation rule.
    #[must_use]
    pub fn with_roles(mut self, roles: MomentumRoles) -> Self {
        self.roles = roles;
        self
    }

    /// Overrides the assigned variable name.
    #[must_use]
    pub fn with_var_name(mut self, var_name: impl Into<String>) -> Self {
        self.var_name = var_name.into();
        self
    }

    /// Returns `topology` with elimination applied to every momentum.
    #[must_use]
    pub fn apply(&self, topology: &Topology) -> Topology {
        topology.map_propagators(|propagator| {
            propagator.with_momentum(eliminate_momentum(
                propagator.momentum(),
                &self.basis,
                self.eliminate,
                &self.roles,
            ))
        })
    }

    /// Eliminates and serializes `topologies`.
    #[must_use]
    pub fn render(&self, topologies: &[Topology]) -> String {
        let rewritten: Vec<Topology> = topologies.iter().map(|t| self.apply(t)).collect();
        serialize(&rewritten, &self.var_name)
    }
}
