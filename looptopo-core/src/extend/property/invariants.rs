//! Invariant checks applied to every generated extension.

use std::collections::BTreeSet;

use proptest::{prop_assert, prop_assert_eq, test_runner::TestCaseResult};

use super::strategies::ExtensionFixture;
use crate::{
    analysis::rank,
    extend::{ExtensionStatus, ShortfallReason},
    lattice::ShiftVector,
};

/// Extends the fixture and checks the structural invariants of the outcome.
pub(super) fn run_extension_invariants(fixture: &ExtensionFixture) -> TestCaseResult {
    let extender = fixture.extender();
    let lattice = fixture.lattice();
    let input = fixture.topology();
    let outcome = extender.extend(&input).expect("fixture inputs are well formed");
    let output = outcome.topology();

    // Append-only growth.
    prop_assert_eq!(output.len(), input.len() + outcome.added());
    prop_assert_eq!(&output.propagators()[..input.len()], input.propagators());

    // Uniqueness.
    let vectors: Vec<ShiftVector> = output
        .propagators()
        .iter()
        .map(|p| lattice.vector_of_momentum(p.momentum()))
        .collect::<Result<_, _>>()
        .expect("every output momentum maps back onto the lattice");
    let distinct: BTreeSet<&ShiftVector> = vectors.iter().collect();
    prop_assert_eq!(distinct.len(), vectors.len());

    // Legal insertion and magnitude bound.
    let mut present: Vec<&ShiftVector> = vectors[..input.len()].iter().collect();
    for (offset, inserted) in outcome.inserted().iter().enumerate() {
        prop_assert_eq!(inserted, &vectors[input.len() + offset]);
        prop_assert!(
            present.iter().any(|node| node.is_adjacent(inserted)),
            "{} has no unit-step neighbour among earlier nodes",
            inserted
        );
        prop_assert!(inserted.max_abs() <= outcome.max_coord());
        present.push(inserted);
    }

    // Termination is bounded and the status is honest.
    prop_assert!(outcome.added() <= extender.max_add());
    let final_rank = rank(&vectors, extender.eliminate());
    prop_assert_eq!(outcome.rank(), final_rank);
    let satisfied = output.len() >= extender.target() && final_rank >= extender.rank_needed();
    match outcome.status() {
        ExtensionStatus::Complete => prop_assert!(satisfied),
        ExtensionStatus::Shortfall(shortfall) => {
            prop_assert!(!satisfied);
            prop_assert_eq!(shortfall.propagators, output.len());
            if shortfall.reason == ShortfallReason::InsertionBudget {
                prop_assert_eq!(outcome.added(), extender.max_add());
            }
        }
    }
    Ok(())
}

/// Extending an already complete result must not insert anything.
pub(super) fn run_idempotence_property(fixture: &ExtensionFixture) -> TestCaseResult {
    let extender = fixture.extender();
    let first = extender
        .extend(&fixture.topology())
        .expect("fixture inputs are well formed");
    if first.is_complete() {
        let second = extender
            .extend(first.topology())
            .expect("engine output is well formed");
        prop_assert_eq!(second.added(), 0);
        prop_assert!(second.is_complete());
    }
    Ok(())
}

/// The same input and configuration always produce the same insertions.
pub(super) fn run_determinism_property(fixture: &ExtensionFixture) -> TestCaseResult {
    let extender = fixture.extender();
    let topology = fixture.topology();
    let a = extender.extend(&topology).expect("fixture inputs are well formed");
    let b = extender.extend(&topology).expect("fixture inputs are well formed");
    prop_assert_eq!(a, b);
    Ok(())
}
