//! Error types for the looptopo core library.
//!
//! Defines the parse and topology error enums exposed by the public API, their
//! stable machine-readable codes, and a convenient result alias.

use std::{fmt, sync::Arc};

use thiserror::Error;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced while reading topology records or linear expressions.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ParseError {
    /// The record did not have the `Name: [[...]]` shape.
    #[error("record `{record}` is not of the form `Name: [[momentum, mass], ...]`")]
    MalformedRecord {
        /// The offending record text.
        record: Arc<str>,
    },
    /// The record name contained characters outside `[A-Za-z0-9_]`.
    #[error("invalid topology name `{name}`")]
    InvalidName {
        /// The rejected name.
        name: Arc<str>,
    },
    /// The propagator list was not wrapped in `[[...]]` or `{{...}}`.
    #[error("expected a list like [[...], [...]] or {{{{...}}}} but got `{found}`")]
    NotAList {
        /// The text that was found instead.
        found: Arc<str>,
    },
    /// Brackets were unbalanced or closed by the wrong kind.
    #[error("bracket mismatch at byte {position}")]
    BracketMismatch {
        /// Byte offset of the offending bracket.
        position: usize,
    },
    /// A propagator entry had no top-level comma between momentum and mass.
    #[error("entry `{entry}` does not contain a momentum/mass separator")]
    MissingSeparator {
        /// The entry without a separator.
        entry: Arc<str>,
    },
    /// An expression was empty.
    #[error("expression is empty")]
    EmptyExpression,
    /// The input contained a character outside the expression grammar.
    #[error("unexpected character `{character}` at byte {position}")]
    UnexpectedCharacter {
        /// The unexpected character.
        character: char,
        /// Byte offset of the character.
        position: usize,
    },
    /// A token appeared where the grammar does not allow it.
    #[error("unexpected `{found}` at byte {position}")]
    UnexpectedToken {
        /// Text of the unexpected token.
        found: Arc<str>,
        /// Byte offset of the token.
        position: usize,
    },
    /// The expression ended while an operand or `)` was still expected.
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    /// A numeric literal could not be represented.
    #[error("numeric literal `{literal}` is out of range")]
    InvalidNumber {
        /// The literal text.
        literal: Arc<str>,
    },
    /// Two non-constant factors were multiplied, or a value was divided by a
    /// non-constant.
    #[error("non-linear term at byte {position}")]
    NonLinear {
        /// Byte offset of the operator that produced the term.
        position: usize,
    },
    /// A value was divided by zero.
    #[error("division by zero at byte {position}")]
    DivisionByZero {
        /// Byte offset of the division operator.
        position: usize,
    },
    /// A coefficient left the exact 64-bit rational range.
    #[error("coefficient overflow at byte {position}")]
    CoefficientOverflow {
        /// Byte offset of the operator whose result overflowed.
        position: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`ParseError`] variants.
    enum ParseErrorCode for ParseError {
        /// The record did not have the `Name: [[...]]` shape.
        MalformedRecord => MalformedRecord { .. } => "PARSE_MALFORMED_RECORD",
        /// The record name was invalid.
        InvalidName => InvalidName { .. } => "PARSE_INVALID_NAME",
        /// The propagator list was not bracketed.
        NotAList => NotAList { .. } => "PARSE_NOT_A_LIST",
        /// Brackets were unbalanced.
        BracketMismatch => BracketMismatch { .. } => "PARSE_BRACKET_MISMATCH",
        /// An entry lacked a separator.
        MissingSeparator => MissingSeparator { .. } => "PARSE_MISSING_SEPARATOR",
        /// An expression was empty.
        EmptyExpression => EmptyExpression => "PARSE_EMPTY_EXPRESSION",
        /// An unexpected character was found.
        UnexpectedCharacter => UnexpectedCharacter { .. } => "PARSE_UNEXPECTED_CHARACTER",
        /// An unexpected token was found.
        UnexpectedToken => UnexpectedToken { .. } => "PARSE_UNEXPECTED_TOKEN",
        /// The expression ended early.
        UnexpectedEnd => UnexpectedEnd => "PARSE_UNEXPECTED_END",
        /// A numeric literal overflowed.
        InvalidNumber => InvalidNumber { .. } => "PARSE_INVALID_NUMBER",
        /// A non-linear term was found.
        NonLinear => NonLinear { .. } => "PARSE_NON_LINEAR",
        /// A division by zero was found.
        DivisionByZero => DivisionByZero { .. } => "PARSE_DIVISION_BY_ZERO",
        /// A coefficient overflowed.
        CoefficientOverflow => CoefficientOverflow { .. } => "PARSE_COEFFICIENT_OVERFLOW",
    }
}

/// Error type produced when mapping, configuring, or extending topologies.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum LoopTopoError {
    /// A record of the input document failed to parse.
    #[error("line {line}: {error}")]
    Parse {
        /// One-based line number of the record.
        line: usize,
        #[source]
        /// Underlying parse failure.
        error: ParseError,
    },
    /// A shift had a fractional coefficient on a basis momentum.
    #[error("coefficient {coefficient} of `{symbol}` in `{expression}` is not an integer")]
    NonIntegerCoefficient {
        /// Basis symbol carrying the coefficient.
        symbol: Arc<str>,
        /// Rendered coefficient.
        coefficient: Arc<str>,
        /// Rendered shift expression.
        expression: Arc<str>,
    },
    /// A shift referenced a symbol that is neither the loop momentum nor a
    /// basis momentum.
    #[error("symbol `{symbol}` in `{expression}` is not part of the momentum basis")]
    ForeignSymbol {
        /// The unknown symbol.
        symbol: Arc<str>,
        /// Rendered shift expression.
        expression: Arc<str>,
    },
    /// A shift carried a non-zero constant term.
    #[error("shift `{expression}` carries a constant term")]
    ConstantShift {
        /// Rendered shift expression.
        expression: Arc<str>,
    },
    /// The loop momentum did not appear with unit coefficient.
    #[error("loop momentum appears with coefficient {coefficient} in `{expression}` (expected 1)")]
    LoopCoefficient {
        /// Rendered coefficient of the loop symbol.
        coefficient: Arc<str>,
        /// Rendered momentum expression.
        expression: Arc<str>,
    },
    /// Two propagators of one topology share a shift vector.
    #[error("topology `{topology}` repeats the propagator momentum `{expression}`")]
    DuplicateShift {
        /// Name of the topology.
        topology: Arc<str>,
        /// Rendered duplicated momentum.
        expression: Arc<str>,
    },
    /// A topology had no propagators.
    #[error("topology `{topology}` has no propagators")]
    EmptyTopology {
        /// Name of the empty topology.
        topology: Arc<str>,
    },
    /// The momentum basis was empty.
    #[error("momentum basis must contain at least one symbol")]
    EmptyBasis,
    /// The momentum basis listed a symbol twice.
    #[error("momentum basis lists `{symbol}` more than once")]
    DuplicateBasisSymbol {
        /// The repeated symbol.
        symbol: Arc<str>,
    },
    /// The loop symbol was also listed as an external momentum.
    #[error("loop symbol `{symbol}` must not appear in the momentum basis")]
    LoopSymbolInBasis {
        /// The loop symbol.
        symbol: Arc<str>,
    },
    /// The eliminate index was outside the basis.
    #[error("eliminate index {index} is outside a basis of size {basis_len}")]
    InvalidEliminateIndex {
        /// The requested index.
        index: usize,
        /// Size of the basis.
        basis_len: usize,
    },
    /// An incoming or outgoing index was outside the basis.
    #[error("momentum role index {index} is outside a basis of size {basis_len}")]
    InvalidRoleIndex {
        /// The requested index.
        index: usize,
        /// Size of the basis.
        basis_len: usize,
    },
    /// A basis index was listed as both incoming and outgoing.
    #[error("momentum {index} is listed as both incoming and outgoing")]
    OverlappingRoles {
        /// The doubly assigned index.
        index: usize,
    },
    /// The required rank exceeds what the (projected) basis can span.
    #[error("rank {rank_needed} cannot be reached in {max_rank} dimensions")]
    UnreachableRank {
        /// The requested rank.
        rank_needed: usize,
        /// Dimension of the projected lattice.
        max_rank: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`LoopTopoError`] variants.
    enum LoopTopoErrorCode for LoopTopoError {
        /// A record failed to parse.
        ParseFailure => Parse { .. } => "LOOPTOPO_PARSE_FAILURE",
        /// A shift had a fractional coefficient.
        NonIntegerCoefficient => NonIntegerCoefficient { .. } => "LOOPTOPO_NON_INTEGER_COEFFICIENT",
        /// A shift referenced an unknown symbol.
        ForeignSymbol => ForeignSymbol { .. } => "LOOPTOPO_FOREIGN_SYMBOL",
        /// A shift carried a constant term.
        ConstantShift => ConstantShift { .. } => "LOOPTOPO_CONSTANT_SHIFT",
        /// The loop momentum coefficient was not one.
        LoopCoefficient => LoopCoefficient { .. } => "LOOPTOPO_LOOP_COEFFICIENT",
        /// A topology repeated a shift vector.
        DuplicateShift => DuplicateShift { .. } => "LOOPTOPO_DUPLICATE_SHIFT",
        /// A topology had no propagators.
        EmptyTopology => EmptyTopology { .. } => "LOOPTOPO_EMPTY_TOPOLOGY",
        /// The basis was empty.
        EmptyBasis => EmptyBasis => "LOOPTOPO_EMPTY_BASIS",
        /// The basis repeated a symbol.
        DuplicateBasisSymbol => DuplicateBasisSymbol { .. } => "LOOPTOPO_DUPLICATE_BASIS_SYMBOL",
        /// The loop symbol appeared in the basis.
        LoopSymbolInBasis => LoopSymbolInBasis { .. } => "LOOPTOPO_LOOP_SYMBOL_IN_BASIS",
        /// The eliminate index was out of range.
        InvalidEliminateIndex => InvalidEliminateIndex { .. } => "LOOPTOPO_INVALID_ELIMINATE_INDEX",
        /// A role index was out of range.
        InvalidRoleIndex => InvalidRoleIndex { .. } => "LOOPTOPO_INVALID_ROLE_INDEX",
        /// A basis index had two roles.
        OverlappingRoles => OverlappingRoles { .. } => "LOOPTOPO_OVERLAPPING_ROLES",
        /// The requested rank is unreachable.
        UnreachableRank => UnreachableRank { .. } => "LOOPTOPO_UNREACHABLE_RANK",
    }
}

impl LoopTopoError {
    /// Retrieve the inner [`ParseErrorCode`] when the error originated in the parser.
    pub const fn parse_code(&self) -> Option<ParseErrorCode> {
        match self {
            Self::Parse { error, .. } => Some(error.code()),
            _ => None,
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, LoopTopoError>;
