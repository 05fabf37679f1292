//! Proptest runners and pinned regressions for the extension engine.

use proptest::prelude::*;
use rstest::rstest;

use super::{
    invariants::{run_determinism_property, run_extension_invariants, run_idempotence_property},
    strategies::{ExtensionFixture, extension_fixture_strategy},
};
use crate::test_utils::suite_proptest_config;

proptest! {
    #![proptest_config(suite_proptest_config(128))]

    #[test]
    fn extension_invariants_hold(fixture in extension_fixture_strategy()) {
        run_extension_invariants(&fixture)?;
    }

    #[test]
    fn extension_is_idempotent_once_complete(fixture in extension_fixture_strategy()) {
        run_idempotence_property(&fixture)?;
    }

    #[test]
    fn extension_is_deterministic(fixture in extension_fixture_strategy()) {
        run_determinism_property(&fixture)?;
    }
}

#[rstest]
#[case::single_axis(1, vec![vec![0]], 20, 0, None, 50)]
#[case::rank_with_elimination(4, vec![vec![0, 0, 0, 0]], 4, 3, Some(3), 50)]
#[case::zero_budget(3, vec![vec![0, 0, 0]], 5, 0, None, 0)]
#[case::far_apart(2, vec![vec![-2, -2], vec![2, 2]], 6, 2, None, 50)]
fn extension_invariants_hold_for_pinned_cases(
    #[case] dim: usize,
    #[case] nodes: Vec<Vec<i64>>,
    #[case] target: usize,
    #[case] rank_needed: usize,
    #[case] eliminate: Option<usize>,
    #[case] max_add: usize,
) {
    let fixture = ExtensionFixture {
        dim,
        nodes,
        target,
        rank_needed,
        eliminate,
        max_add,
    };
    run_extension_invariants(&fixture).expect("invariants must hold");
}
