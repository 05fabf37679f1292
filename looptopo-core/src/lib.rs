//! One-loop topology completion.
//!
//! Parses propagator lists, maps momenta onto an integer shift lattice,
//! extends topologies by unit-step insertions until a target size and rank
//! are met, and serializes the result with optional momentum elimination.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod analysis;
mod batch;
mod error;
mod expr;
mod extend;
mod format;
mod lattice;
mod parser;
mod topology;

#[cfg(test)]
pub(crate) mod test_utils;

pub use crate::{
    analysis::{covered_directions, magnitude_floor, missing_directions, neighbour_count, rank},
    batch::extend_all,
    error::{LoopTopoError, LoopTopoErrorCode, ParseError, ParseErrorCode, Result},
    expr::{Coefficient, LinearExpr},
    extend::{
        Extender, ExtenderBuilder, ExtensionOutcome, ExtensionShortfall, ExtensionStatus,
        ShortfallReason,
    },
    format::{
        DEFAULT_VAR_NAME, MomentumRoles, OUTPUT_HEADER, OutputFormatter, eliminate_momentum,
        serialize,
    },
    lattice::{Basis, Lattice, ShiftVector, shift_of, vector_of, vector_to_expr},
    parser::{parse_document, parse_expression, parse_record, parse_topology_list},
    topology::{Propagator, Topology},
};
