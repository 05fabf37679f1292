//! Tokeniser for linear momentum and mass expressions.

use std::sync::Arc;

use num_rational::Rational64;

use crate::error::ParseError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) enum TokenKind {
    Number(Rational64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl TokenKind {
    pub(super) fn describe(&self) -> String {
        match self {
            Self::Number(value) => value.to_string(),
            Self::Ident(name) => name.clone(),
            Self::Plus => "+".to_owned(),
            Self::Minus => "-".to_owned(),
            Self::Star => "*".to_owned(),
            Self::Slash => "/".to_owned(),
            Self::LParen => "(".to_owned(),
            Self::RParen => ")".to_owned(),
        }
    }

    /// Whether the token can open a factor, which is what licenses implicit
    /// multiplication (`2p1`, `2 (p1 + p2)`).
    pub(super) const fn starts_factor(&self) -> bool {
        matches!(self, Self::Number(_) | Self::Ident(_) | Self::LParen)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct Token {
    pub(super) kind: TokenKind,
    pub(super) position: usize,
}

pub(super) fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();
    while let Some(&(position, ch)) = chars.peek() {
        let kind = match ch {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            c if c.is_ascii_digit() || c == '.' => {
                let mut literal = String::new();
                while let Some(&(_, next)) = chars.peek() {
                    if !(next.is_ascii_digit() || next == '.') {
                        break;
                    }
                    literal.push(next);
                    chars.next();
                }
                tokens.push(Token {
                    kind: TokenKind::Number(parse_number(&literal)?),
                    position,
                });
                continue;
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(&(_, next)) = chars.peek() {
                    if !(next.is_ascii_alphanumeric() || next == '_') {
                        break;
                    }
                    name.push(next);
                    chars.next();
                }
                tokens.push(Token {
                    kind: TokenKind::Ident(name),
                    position,
                });
                continue;
            }
            other => {
                return Err(ParseError::UnexpectedCharacter {
                    character: other,
                    position,
                });
            }
        };
        chars.next();
        tokens.push(Token { kind, position });
    }
    Ok(tokens)
}

fn parse_number(literal: &str) -> Result<Rational64, ParseError> {
    let invalid = || ParseError::InvalidNumber {
        literal: Arc::from(literal),
    };
    let (whole, fraction) = literal.split_once('.').unwrap_or((literal, ""));
    if fraction.contains('.') || (whole.is_empty() && fraction.is_empty()) {
        return Err(invalid());
    }
    let digits = format!("{whole}{fraction}");
    let numerator: i64 = digits.parse().map_err(|_| invalid())?;
    let exponent = u32::try_from(fraction.len()).map_err(|_| invalid())?;
    let denominator = 10_i64.checked_pow(exponent).ok_or_else(invalid)?;
    Ok(Rational64::new(numerator, denominator))
}
