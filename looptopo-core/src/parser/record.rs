//! Topology record parsing (`Name: [[momentum, mass], ...]`).

use std::sync::Arc;

use super::expression::parse_expression;
use crate::{
    error::{LoopTopoError, ParseError, Result},
    topology::{Propagator, Topology},
};

/// Parses a bracketed propagator list such as `[[l, mt], [l - p2, 0]]` or
/// `{{l, 0}, {l - p1 - p2, 0}}`.
///
/// # Errors
/// Returns [`ParseError`] when the list is not doubly bracketed, brackets do
/// not balance, an entry lacks its momentum/mass separator, or an expression
/// fails to parse.
///
/// # Examples
/// ```
/// use looptopo_core::parse_topology_list;
///
/// let props = parse_topology_list("{{l,0},{l-p1-p2,0}}").expect("valid list");
/// assert_eq!(props.len(), 2);
/// assert_eq!(props[1].momentum().to_string(), "l - p1 - p2");
/// ```
pub fn parse_topology_list(raw: &str) -> core::result::Result<Vec<Propagator>, ParseError> {
    let text = raw.trim();
    let doubly_bracketed = (text.starts_with("[[") && text.ends_with("]]"))
        || (text.starts_with("{{") && text.ends_with("}}"));
    if !doubly_bracketed {
        return Err(ParseError::NotAList {
            found: Arc::from(text),
        });
    }
    check_balanced(text)?;
    let inner = strip_outer(text);
    split_entries(inner)?
        .into_iter()
        .map(parse_entry)
        .collect()
}

/// Parses one `Name: [[...]]` record, with an optional trailing `;`.
///
/// # Errors
/// Returns [`ParseError`] when the name or separator is missing or the list
/// fails to parse.
///
/// # Examples
/// ```
/// use looptopo_core::parse_record;
///
/// let topo = parse_record("top1: [[l, mt], [l - p1 - p2 + p3, 0], [l - p2, mt]]")
///     .expect("valid record");
/// assert_eq!(topo.name(), "top1");
/// assert_eq!(topo.len(), 3);
/// ```
pub fn parse_record(line: &str) -> core::result::Result<Topology, ParseError> {
    let trimmed = line.trim();
    let body = trimmed.strip_suffix(';').unwrap_or(trimmed).trim_end();
    let (name, list) = body.split_once(':').ok_or_else(|| ParseError::MalformedRecord {
        record: Arc::from(trimmed),
    })?;
    let name = name.trim();
    if name.is_empty() {
        return Err(ParseError::MalformedRecord {
            record: Arc::from(trimmed),
        });
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ParseError::InvalidName {
            name: Arc::from(name),
        });
    }
    Ok(Topology::new(name, parse_topology_list(list)?))
}

/// Parses a whole topology document, one record per line.
///
/// Blank lines and lines starting with `#` are skipped.
///
/// # Errors
/// Returns [`LoopTopoError::Parse`] carrying the one-based line number of the
/// first malformed record.
///
/// # Examples
/// ```
/// use looptopo_core::parse_document;
///
/// let doc = "# generated\n\ntop1: [[l, mt], [l - p2, mt]]\ntest2: {{l,0},{l-p1-p2,0}}\n";
/// let topologies = parse_document(doc).expect("valid document");
/// assert_eq!(topologies.len(), 2);
/// assert_eq!(topologies[1].name(), "test2");
/// ```
pub fn parse_document(text: &str) -> Result<Vec<Topology>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(|(index, line)| {
            parse_record(line).map_err(|error| LoopTopoError::Parse {
                line: index + 1,
                error,
            })
        })
        .collect()
}

const fn closing_for(open: char) -> char {
    if open == '[' { ']' } else { '}' }
}

fn check_balanced(text: &str) -> core::result::Result<(), ParseError> {
    let mut stack = Vec::new();
    for (position, ch) in text.char_indices() {
        match ch {
            '[' | '{' => stack.push(closing_for(ch)),
            ']' | '}' => {
                if stack.pop() != Some(ch) {
                    return Err(ParseError::BracketMismatch { position });
                }
            }
            _ => {}
        }
    }
    if stack.is_empty() {
        Ok(())
    } else {
        Err(ParseError::BracketMismatch {
            position: text.len(),
        })
    }
}

/// Drops the first and last character; callers guarantee both are brackets.
fn strip_outer(text: &str) -> &str {
    let mut chars = text.chars();
    chars.next();
    chars.next_back();
    chars.as_str()
}

fn split_entries(inner: &str) -> core::result::Result<Vec<&str>, ParseError> {
    let mut entries = Vec::new();
    let mut depth = 0_usize;
    let mut start = None;
    for (position, ch) in inner.char_indices() {
        match ch {
            '[' | '{' => {
                if depth == 0 {
                    start = Some(position);
                }
                depth += 1;
            }
            ']' | '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    if let Some(begin) = start.take() {
                        let end = position + ch.len_utf8();
                        entries.push(inner.get(begin..end).unwrap_or_default());
                    }
                }
            }
            ',' => {}
            c if depth == 0 && !c.is_whitespace() => {
                return Err(ParseError::UnexpectedCharacter {
                    character: c,
                    position,
                });
            }
            _ => {}
        }
    }
    Ok(entries)
}

fn parse_entry(entry: &str) -> core::result::Result<Propagator, ParseError> {
    let payload = strip_outer(entry.trim());
    let separator = top_level_comma(payload).ok_or_else(|| ParseError::MissingSeparator {
        entry: Arc::from(entry.trim()),
    })?;
    let (momentum, mass) = payload.split_at(separator);
    let mass = mass.get(1..).unwrap_or_default();
    Ok(Propagator::new(
        parse_expression(momentum)?,
        parse_expression(mass)?,
    ))
}

fn top_level_comma(payload: &str) -> Option<usize> {
    let mut depth = 0_usize;
    for (position, ch) in payload.char_indices() {
        match ch {
            '[' | '{' | '(' => depth += 1,
            ']' | '}' | ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return Some(position),
            _ => {}
        }
    }
    None
}
