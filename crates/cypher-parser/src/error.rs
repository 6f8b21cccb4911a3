//! Parse error types.

use std::fmt;

use cypher_lexer::TokenKind;
use cypher_types::ErrorCode;
use thiserror::Error;

/// What the parser was looking for when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    /// A specific token kind.
    Token(TokenKind),
    /// The start of an expression.
    Expression,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Token(kind) => f.write_str(&kind.describe()),
            Expected::Expression => f.write_str("expression"),
        }
    }
}

/// Parsing failure. The first one aborts the parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected {expected}, found {} on line {line}", .found.describe())]
    UnexpectedToken {
        expected: Expected,
        found: TokenKind,
        line: u32,
    },

    #[error("malformed number literal '{text}' on line {line}")]
    InvalidNumber { text: String, line: u32 },

    #[error("nesting deeper than {limit} levels on line {line}")]
    NestingTooDeep { limit: usize, line: u32 },
}

impl ParseError {
    /// 1-based line of the failure.
    pub fn line(&self) -> u32 {
        match self {
            ParseError::UnexpectedToken { line, .. }
            | ParseError::InvalidNumber { line, .. }
            | ParseError::NestingTooDeep { line, .. } => *line,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ParseError::UnexpectedToken { .. } => ErrorCode::UNEXPECTED_TOKEN,
            ParseError::InvalidNumber { .. } => ErrorCode::INVALID_NUMBER,
            ParseError::NestingTooDeep { .. } => ErrorCode::NESTING_TOO_DEEP,
        }
    }
}

/// Result alias for parsing.
pub type ParseResult<T> = Result<T, ParseError>;
