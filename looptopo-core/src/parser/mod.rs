//! Text front end: linear expressions and topology records.

mod expression;
mod lexer;
mod record;

pub use expression::parse_expression;
pub use record::{parse_document, parse_record, parse_topology_list};
