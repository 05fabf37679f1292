//! Helpers shared by the integration suites.
#![allow(dead_code)]

use looptopo_core::{Basis, Extender, ExtenderBuilder, Lattice, Topology};

/// Four external momenta `p1..p4` and loop momentum `l`.
pub fn lattice4() -> Lattice {
    Lattice::new("l", Basis::numbered("p", 4).expect("basis")).expect("lattice")
}

/// The configuration the command-line front end uses for four legs:
/// eliminate `p4`, ask for rank three and four propagators.
pub fn eliminating_extender() -> Extender {
    ExtenderBuilder::new(lattice4())
        .with_target(4)
        .with_eliminate(Some(3))
        .with_rank_needed(3)
        .build()
        .expect("valid configuration")
}

/// Shift vectors of every propagator as plain coordinates.
pub fn coordinates(lattice: &Lattice, topology: &Topology) -> Vec<Vec<i64>> {
    topology
        .propagators()
        .iter()
        .map(|p| {
            lattice
                .vector_of_momentum(p.momentum())
                .expect("momentum on lattice")
                .coords()
                .to_vec()
        })
        .collect()
}

/// A small input document in the accepted record syntax.
pub const DOCUMENT: &str = "\
# sample one-loop topologies
top1: [[l, mt], [l - p1 - p2 + p3, 0], [l - p2, mt]]

test2: {{l,0},{l-p1-p2,0}};
box: [[l, 0], [l + p1, 0], [l + p1 + p2, 0], [l + p1 + p2 + p3, 0]]
";
