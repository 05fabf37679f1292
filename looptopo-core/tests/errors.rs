//! Error codes surfaced through the public API.

use looptopo_core::{
    Basis, ExtenderBuilder, Lattice, LoopTopoError, LoopTopoErrorCode, ParseErrorCode,
    parse_document,
};
use rstest::rstest;

#[rstest]
#[case::second_line("a: [[l, 0]]\nb: [l, 0]\n", 2, ParseErrorCode::NotAList)]
#[case::after_comment("# header\n\nbad name: [[l, 0]]\n", 3, ParseErrorCode::InvalidName)]
#[case::no_colon("a [[l, 0]]\n", 1, ParseErrorCode::MalformedRecord)]
#[case::coefficient_overflow(
    "a: [[l, 0]]\nb: [[l + 9000000000000000000 p1 + 9000000000000000000 p1, 0]]\n",
    2,
    ParseErrorCode::CoefficientOverflow
)]
fn parse_failures_report_the_line(
    #[case] doc: &str,
    #[case] expected_line: usize,
    #[case] expected: ParseErrorCode,
) {
    let err = parse_document(doc).expect_err("document must be rejected");
    assert_eq!(err.code(), LoopTopoErrorCode::ParseFailure);
    match err {
        LoopTopoError::Parse { line, error } => {
            assert_eq!(line, expected_line);
            assert_eq!(error.code(), expected);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[rstest]
#[case::empty(Vec::new(), LoopTopoErrorCode::EmptyBasis)]
#[case::duplicate(vec!["p1", "p1"], LoopTopoErrorCode::DuplicateBasisSymbol)]
fn basis_validation(#[case] symbols: Vec<&str>, #[case] expected: LoopTopoErrorCode) {
    let err = Basis::new(symbols).expect_err("basis must be rejected");
    assert_eq!(err.code(), expected);
}

#[test]
fn loop_symbol_must_not_be_a_basis_momentum() {
    let basis = Basis::new(["l", "p1"]).expect("basis");
    let err = Lattice::new("l", basis).expect_err("lattice must be rejected");
    assert_eq!(err.code(), LoopTopoErrorCode::LoopSymbolInBasis);
}

#[rstest]
#[case::eliminate_out_of_range(Some(4), 0, LoopTopoErrorCode::InvalidEliminateIndex)]
#[case::rank_above_projection(Some(3), 4, LoopTopoErrorCode::UnreachableRank)]
#[case::rank_above_dimension(None, 5, LoopTopoErrorCode::UnreachableRank)]
fn builder_validation(
    #[case] eliminate: Option<usize>,
    #[case] rank_needed: usize,
    #[case] expected: LoopTopoErrorCode,
) {
    let lattice = Lattice::new("l", Basis::numbered("p", 4).expect("basis")).expect("lattice");
    let err = ExtenderBuilder::new(lattice)
        .with_eliminate(eliminate)
        .with_rank_needed(rank_needed)
        .build()
        .expect_err("configuration must be rejected");
    assert_eq!(err.code(), expected);
}
