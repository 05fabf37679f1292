//! Fixture generation for extension properties.

use proptest::{collection, prelude::*};

use crate::{
    expr::LinearExpr,
    extend::{Extender, ExtenderBuilder},
    lattice::{Basis, Lattice, ShiftVector},
    topology::{Propagator, Topology},
};

/// Largest coordinate magnitude in generated inputs.
const MAX_INPUT_COORD: i64 = 2;
/// Largest generated input size.
const MAX_INPUT_NODES: usize = 6;

/// One randomly generated extension problem.
#[derive(Clone, Debug)]
pub(super) struct ExtensionFixture {
    pub(super) dim: usize,
    pub(super) nodes: Vec<Vec<i64>>,
    pub(super) target: usize,
    pub(super) rank_needed: usize,
    pub(super) eliminate: Option<usize>,
    pub(super) max_add: usize,
}

impl ExtensionFixture {
    pub(super) fn lattice(&self) -> Lattice {
        let basis = Basis::numbered("p", self.dim).expect("fixture dimension is non-zero");
        Lattice::new("l", basis).expect("loop symbol is outside the basis")
    }

    pub(super) fn extender(&self) -> Extender {
        ExtenderBuilder::new(self.lattice())
            .with_target(self.target)
            .with_rank_needed(self.rank_needed)
            .with_eliminate(self.eliminate)
            .with_max_add(self.max_add)
            .build()
            .expect("fixture configuration is valid")
    }

    /// Input topology; every other propagator carries the mass `mt`.
    pub(super) fn topology(&self) -> Topology {
        let lattice = self.lattice();
        let propagators = self
            .nodes
            .iter()
            .enumerate()
            .map(|(index, coords)| {
                let mass = if index % 2 == 0 {
                    LinearExpr::symbol("mt")
                } else {
                    LinearExpr::zero()
                };
                Propagator::new(lattice.vector_to_expr(&ShiftVector::new(coords.clone())), mass)
            })
            .collect();
        Topology::new("fixture", propagators)
    }
}

/// Generates fixtures over 1 to 4 dimensions with consistent rank limits.
pub(super) fn extension_fixture_strategy() -> impl Strategy<Value = ExtensionFixture> {
    (1_usize..=4)
        .prop_flat_map(|dim| {
            let nodes = collection::btree_set(
                collection::vec(-MAX_INPUT_COORD..=MAX_INPUT_COORD, dim),
                1..=MAX_INPUT_NODES,
            );
            let eliminate = prop::option::of(0..dim);
            (Just(dim), nodes, eliminate, 1_usize..=10, 0_usize..=12, 0_usize..=dim)
        })
        .prop_map(|(dim, nodes, eliminate, target, max_add, rank_seed)| {
            let max_rank = dim - usize::from(eliminate.is_some());
            ExtensionFixture {
                dim,
                nodes: nodes.into_iter().collect(),
                target,
                rank_needed: rank_seed.min(max_rank),
                eliminate,
                max_add,
            }
        })
}
