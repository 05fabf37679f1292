//! End-to-end tests: parse, extend, eliminate and serialize.

mod common;

use common::{DOCUMENT, coordinates, eliminating_extender, lattice4};
use looptopo_core::{
    ExtenderBuilder, MomentumRoles, OUTPUT_HEADER, OutputFormatter, extend_all, parse_document,
    rank,
};
use looptopo_test_support::lattice::{all_distinct, is_connected};
use rstest::rstest;

#[rstest]
fn document_extends_to_connected_complete_topologies() {
    let topologies = parse_document(DOCUMENT).expect("document");
    assert_eq!(topologies.len(), 3);

    let extender = ExtenderBuilder::new(lattice4())
        .with_target(4)
        .build()
        .expect("extender");
    let outcomes = extend_all(&extender, &topologies).expect("batch");

    let lattice = lattice4();
    for (input, outcome) in topologies.iter().zip(&outcomes) {
        assert!(outcome.is_complete(), "{} fell short", input.name());
        let coords = coordinates(&lattice, outcome.topology());
        assert_eq!(coords.len(), 4);
        assert!(all_distinct(&coords));
        assert!(is_connected(&coords), "{} is not connected", input.name());
        assert_eq!(
            &outcome.topology().propagators()[..input.len()],
            input.propagators()
        );
    }
}

#[rstest]
fn projected_rank_is_reached_before_elimination() {
    let topologies = parse_document(DOCUMENT).expect("document");
    let extender = eliminating_extender();
    let lattice = lattice4();

    for outcome in extend_all(&extender, &topologies).expect("batch") {
        assert!(outcome.is_complete());
        let vectors: Vec<_> = outcome
            .topology()
            .propagators()
            .iter()
            .map(|p| lattice.vector_of_momentum(p.momentum()).expect("vector"))
            .collect();
        assert!(rank(&vectors, Some(3)) >= 3);
    }
}

#[rstest]
fn rendered_output_eliminates_the_last_momentum() {
    let topologies = parse_document("t: [[l, 0], [l + p4, mt]]").expect("document");
    let outcomes = extend_all(
        &ExtenderBuilder::new(lattice4()).build().expect("extender"),
        &topologies,
    )
    .expect("batch");
    let extended: Vec<_> = outcomes.into_iter().map(|o| o.into_topology()).collect();

    let text = OutputFormatter::new(lattice4().basis().clone())
        .with_eliminate(Some(3))
        .with_roles(MomentumRoles::split(4, 2))
        .render(&extended);

    assert!(text.starts_with(OUTPUT_HEADER));
    assert!(text.contains("Extended = {\n"));
    assert!(text.contains("{l + p1 + p2 - p3, mt}"));
    assert!(!text.contains("p4"));
    assert!(text.ends_with("\n};\n"));
}

#[rstest]
fn unchanged_topologies_render_verbatim() {
    let topologies = parse_document("a: [[l, mt], [l - p1, 0], [l - p1 - p2, 0], [l - p2, mt]]")
        .expect("document");
    let outcomes = extend_all(
        &ExtenderBuilder::new(lattice4()).build().expect("extender"),
        &topologies,
    )
    .expect("batch");
    assert_eq!(outcomes[0].added(), 0);

    let text = OutputFormatter::new(lattice4().basis().clone())
        .with_var_name("Topos")
        .render(&[outcomes[0].topology().clone()]);
    assert_eq!(
        text,
        "(* Auto-generated by looptopo *)\nTopos = {\n  {{l, mt}, {l - p1, 0}, {l - p1 - p2, 0}, {l - p2, mt}}\n};\n"
    );
}
