//! Recursive-descent parser producing [`LinearExpr`] values.
//!
//! Grammar (implicit multiplication binds like `*`):
//!
//! ```text
//! sum     := product (('+' | '-') product)*
//! product := unary (('*' | '/') unary | atom)*
//! unary   := ('+' | '-') unary | atom
//! atom    := number | ident | '(' sum ')'
//! ```

use std::sync::Arc;

use num_traits::Zero;

use super::lexer::{Token, TokenKind, tokenize};
use crate::{error::ParseError, expr::LinearExpr};

/// Parses a linear expression such as `l - p1 - p2 + p3` or `2(p1 + p2)/2`.
///
/// # Errors
/// Returns [`ParseError`] for empty input, characters or tokens outside the
/// grammar, unbalanced parentheses, non-linear products, division by zero,
/// and coefficients that overflow `i64`.
///
/// # Examples
/// ```
/// use looptopo_core::parse_expression;
///
/// let expr = parse_expression("l - p1 - p2 + p3").expect("valid expression");
/// assert_eq!(expr.to_string(), "l - p1 - p2 + p3");
///
/// let implicit = parse_expression("2(p1 + p2) - p1").expect("valid expression");
/// assert_eq!(implicit.to_string(), "p1 + 2*p2");
/// ```
pub fn parse_expression(input: &str) -> Result<LinearExpr, ParseError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ParseError::EmptyExpression);
    }
    let mut parser = ExprParser {
        tokens: &tokens,
        cursor: 0,
    };
    let expr = parser.parse_sum()?;
    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(unexpected(token)),
    }
}

struct ExprParser<'a> {
    tokens: &'a [Token],
    cursor: usize,
}

impl ExprParser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.cursor);
        if token.is_some() {
            self.cursor += 1;
        }
        token
    }

    fn parse_sum(&mut self) -> Result<LinearExpr, ParseError> {
        let mut acc = self.parse_product()?;
        while let Some((kind, position)) =
            self.peek().map(|token| (token.kind.clone(), token.position))
        {
            let combined = match kind {
                TokenKind::Plus => {
                    self.advance();
                    acc.checked_add(&self.parse_product()?)
                }
                TokenKind::Minus => {
                    self.advance();
                    acc.checked_sub(&self.parse_product()?)
                }
                _ => break,
            };
            acc = combined.ok_or(ParseError::CoefficientOverflow { position })?;
        }
        Ok(acc)
    }

    fn parse_product(&mut self) -> Result<LinearExpr, ParseError> {
        let mut acc = self.parse_unary()?;
        while let Some((kind, position)) =
            self.peek().map(|token| (token.kind.clone(), token.position))
        {
            match kind {
                TokenKind::Star => {
                    self.advance();
                    let rhs = self.parse_unary()?;
                    acc = multiply(&acc, &rhs, position)?;
                }
                TokenKind::Slash => {
                    self.advance();
                    let rhs = self.parse_unary()?;
                    acc = divide(&acc, &rhs, position)?;
                }
                ref factor if factor.starts_factor() => {
                    let rhs = self.parse_atom()?;
                    acc = multiply(&acc, &rhs, position)?;
                }
                _ => break,
            }
        }
        Ok(acc)
    }

    fn parse_unary(&mut self) -> Result<LinearExpr, ParseError> {
        match self.peek().map(|token| &token.kind) {
            Some(TokenKind::Minus) => {
                let position = self.advance().map_or(0, |token| token.position);
                self.parse_unary()?
                    .checked_neg()
                    .ok_or(ParseError::CoefficientOverflow { position })
            }
            Some(TokenKind::Plus) => {
                self.advance();
                self.parse_unary()
            }
            _ => self.parse_atom(),
        }
    }

    fn parse_atom(&mut self) -> Result<LinearExpr, ParseError> {
        let token = self.advance().cloned().ok_or(ParseError::UnexpectedEnd)?;
        match token.kind {
            TokenKind::Number(value) => Ok(LinearExpr::constant(value)),
            TokenKind::Ident(name) => Ok(LinearExpr::symbol(name)),
            TokenKind::LParen => {
                let inner = self.parse_sum()?;
                match self.advance() {
                    Some(Token {
                        kind: TokenKind::RParen,
                        ..
                    }) => Ok(inner),
                    Some(other) => Err(unexpected(other)),
                    None => Err(ParseError::UnexpectedEnd),
                }
            }
            _ => Err(unexpected(&token)),
        }
    }
}

fn multiply(lhs: &LinearExpr, rhs: &LinearExpr, position: usize) -> Result<LinearExpr, ParseError> {
    let product = match (lhs.as_constant(), rhs.as_constant()) {
        (Some(factor), _) => rhs.checked_scaled(factor),
        (None, Some(factor)) => lhs.checked_scaled(factor),
        (None, None) => return Err(ParseError::NonLinear { position }),
    };
    product.ok_or(ParseError::CoefficientOverflow { position })
}

fn divide(lhs: &LinearExpr, rhs: &LinearExpr, position: usize) -> Result<LinearExpr, ParseError> {
    let divisor = rhs.as_constant().ok_or(ParseError::NonLinear { position })?;
    if divisor.is_zero() {
        return Err(ParseError::DivisionByZero { position });
    }
    lhs.checked_scaled(divisor.recip())
        .ok_or(ParseError::CoefficientOverflow { position })
}

fn unexpected(token: &Token) -> ParseError {
    ParseError::UnexpectedToken {
        found: Arc::from(token.kind.describe()),
        position: token.position,
    }
}
