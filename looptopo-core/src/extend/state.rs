//! Per-call mutable state of the extension engine.

use std::{collections::BTreeSet, sync::Arc};

use super::strategy::Frontier;
use crate::{
    analysis::{magnitude_floor, missing_directions, rank},
    error::{LoopTopoError, Result},
    expr::LinearExpr,
    lattice::{Lattice, ShiftVector},
    topology::{Propagator, Topology},
};

/// Everything one [`super::Extender::extend`] call mutates.
///
/// The node set and the topology grow together; nothing is ever removed.
#[derive(Debug)]
pub(crate) struct ExtensionState {
    nodes: BTreeSet<ShiftVector>,
    topology: Topology,
    inserted: Vec<ShiftVector>,
    max_coord: u64,
    relaxations: usize,
}

impl ExtensionState {
    /// Maps every input propagator onto the lattice.
    pub(crate) fn seed(lattice: &Lattice, topology: &Topology) -> Result<Self> {
        if topology.is_empty() {
            return Err(LoopTopoError::EmptyTopology {
                topology: Arc::from(topology.name()),
            });
        }
        let mut nodes = BTreeSet::new();
        for propagator in topology.propagators() {
            let vector = lattice.vector_of_momentum(propagator.momentum())?;
            if !nodes.insert(vector) {
                return Err(LoopTopoError::DuplicateShift {
                    topology: Arc::from(topology.name()),
                    expression: Arc::from(propagator.momentum().to_string()),
                });
            }
        }
        let max_coord = magnitude_floor(&nodes);
        Ok(Self {
            nodes,
            topology: topology.clone(),
            inserted: Vec::new(),
            max_coord,
            relaxations: 0,
        })
    }

    pub(crate) fn name(&self) -> &str {
        self.topology.name()
    }

    pub(crate) fn len(&self) -> usize {
        self.topology.len()
    }

    pub(crate) fn added(&self) -> usize {
        self.inserted.len()
    }

    pub(crate) fn max_coord(&self) -> u64 {
        self.max_coord
    }

    pub(crate) fn relaxations(&self) -> usize {
        self.relaxations
    }

    pub(crate) fn rank(&self, eliminate: Option<usize>) -> usize {
        rank(&self.nodes, eliminate)
    }

    pub(crate) fn missing(&self, dim: usize, eliminate: Option<usize>) -> Vec<usize> {
        missing_directions(&self.nodes, dim, eliminate)
    }

    pub(crate) fn frontier<'a>(&'a self, missing: &'a [usize], dim: usize) -> Frontier<'a> {
        Frontier::new(&self.nodes, missing, self.max_coord, dim)
    }

    /// Appends the propagator for `vector` with the given mass.
    pub(crate) fn insert(&mut self, vector: ShiftVector, lattice: &Lattice, mass: &LinearExpr) {
        let momentum = lattice.vector_to_expr(&vector);
        self.topology.push(Propagator::new(momentum, mass.clone()));
        self.nodes.insert(vector.clone());
        self.inserted.push(vector);
    }

    /// Raises the magnitude bound by one.
    pub(crate) fn relax(&mut self) {
        self.max_coord = self.max_coord.saturating_add(1);
        self.relaxations += 1;
    }

    pub(crate) fn into_parts(self) -> (Topology, Vec<ShiftVector>, u64) {
        (self.topology, self.inserted, self.max_coord)
    }
}
