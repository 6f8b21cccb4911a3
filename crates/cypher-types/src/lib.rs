//! Shared types for the Cypher interpreter.
//!
//! This crate defines the AST node types, the source file wrapper, and the
//! structured diagnostic type shared by every pipeline stage.

mod error;
mod source;
pub mod ast;

pub use error::{Diagnostic, ErrorCategory, ErrorCode};
pub use source::SourceFile;

/// Name under which the `cypher { ... }` entry point is registered.
pub const ENTRY_POINT: &str = "cypher";
