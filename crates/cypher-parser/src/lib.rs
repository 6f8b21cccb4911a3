//! Cypher parser: converts a token stream into an AST.

mod error;
mod parse_expr;
mod parse_stmt;
mod parser;

pub use error::{Expected, ParseError, ParseResult};
pub use parser::{parse, Parser, MAX_NESTING_DEPTH};
