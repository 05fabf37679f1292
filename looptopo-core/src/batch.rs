//! Extension of many independent topologies.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
#[cfg(feature = "parallel")]
use tracing::{Dispatch, Span, dispatcher};
use tracing::instrument;

use crate::{
    Result,
    extend::{ExtensionOutcome, Extender},
    topology::Topology,
};

/// Extends every topology with `extender`, keeping input order.
///
/// Topologies share nothing, so with the `parallel` feature they are
/// extended on the rayon pool. The first failing topology in input order
/// determines the returned error.
///
/// # Errors
/// Returns the [`crate::LoopTopoError`] of the first topology that cannot be
/// mapped onto the lattice.
///
/// # Examples
/// ```
/// use looptopo_core::{Basis, ExtenderBuilder, Lattice, extend_all, parse_document};
///
/// let extender = ExtenderBuilder::new(Lattice::new("l", Basis::numbered("p", 4)?)?).build()?;
/// let topologies = parse_document("a: [[l, 0]]\nb: [[l, 0], [l - p1 - p2, 0]]\n")?;
/// let outcomes = extend_all(&extender, &topologies)?;
/// assert_eq!(outcomes.len(), 2);
/// assert_eq!(outcomes[1].topology().name(), "b");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[instrument(name = "engine.extend_all", skip_all, fields(topologies = topologies.len()))]
pub fn extend_all(extender: &Extender, topologies: &[Topology]) -> Result<Vec<ExtensionOutcome>> {
    // Rayon workers inherit neither the caller's dispatcher nor its span.
    #[cfg(feature = "parallel")]
    let outcomes: Vec<Result<ExtensionOutcome>> = {
        let dispatch = dispatcher::get_default(Dispatch::clone);
        let parent = Span::current();
        topologies
            .par_iter()
            .map(|topology| {
                dispatcher::with_default(&dispatch, || {
                    parent.in_scope(|| extender.extend(topology))
                })
            })
            .collect()
    };
    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<Result<ExtensionOutcome>> = topologies
        .iter()
        .map(|topology| extender.extend(topology))
        .collect();
    outcomes.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{
        extend::ExtenderBuilder,
        lattice::{Basis, Lattice},
        parser::parse_document,
    };

    fn extender() -> Extender {
        let lattice = Lattice::new("l", Basis::numbered("p", 4).expect("basis")).expect("lattice");
        ExtenderBuilder::new(lattice).build().expect("extender")
    }

    #[test]
    fn extend_all_preserves_input_order() {
        let doc = (0..16)
            .map(|i| format!("t{i}: [[l, 0]]"))
            .collect::<Vec<_>>()
            .join("\n");
        let topologies = parse_document(&doc).expect("document");
        let outcomes = extend_all(&extender(), &topologies).expect("batch");
        let names: Vec<&str> = outcomes.iter().map(|o| o.topology().name()).collect();
        let expected: Vec<String> = (0..16).map(|i| format!("t{i}")).collect();
        assert_eq!(names, expected.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn extend_all_reports_the_first_failure_in_order() {
        let topologies = parse_document("ok: [[l, 0]]\nbad1: [[l + q, 0]]\nbad2: [[l + 1, 0]]\n")
            .expect("document");
        let err = extend_all(&extender(), &topologies).expect_err("bad1 fails");
        assert_eq!(err.code().as_str(), "LOOPTOPO_FOREIGN_SYMBOL");
    }
}
