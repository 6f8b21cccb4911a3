//! Cypher tree-walking evaluator.
//!
//! Executes a parsed [`Program`](cypher_types::ast::Program) directly from the
//! AST against a chain of lexical scopes. Output and input go through a
//! [`Host`], so runs can be captured in memory or attached to stdio.

mod env;
mod error;
mod evaluator;
mod host;
mod value;

pub use env::Environment;
pub use error::{Access, EvalError, EvalResult};
pub use evaluator::{EvalConfig, Interpreter, DEFAULT_MAX_CALL_DEPTH, DEFAULT_MAX_EVAL_DEPTH};
pub use host::{CaptureHost, Host, StdHost};
pub use value::{Builtin, Function, Value};
