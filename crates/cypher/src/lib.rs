//! Cypher interpreter: orchestrates the full pipeline.
//!
//! ```text
//! Source → Lexer → Parser → Evaluator → output lines + result
//! ```
//!
//! Every stage stops at its first error. [`run`] captures output in memory;
//! [`run_with`] runs against any [`Host`].

use cypher_lexer::LexError;
use cypher_parser::ParseError;
use log::debug;
use thiserror::Error;

pub use cypher_eval::{
    Access, CaptureHost, EvalConfig, EvalError, Host, StdHost, Value, DEFAULT_MAX_CALL_DEPTH,
    DEFAULT_MAX_EVAL_DEPTH,
};
pub use cypher_types::ast::Program;
pub use cypher_types::{Diagnostic, ErrorCategory, ErrorCode, SourceFile};

/// Any pipeline failure.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl Error {
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::Lex(e) => e.code(),
            Error::Parse(e) => e.code(),
            Error::Eval(e) => e.code(),
        }
    }

    /// Source line of the failure. Runtime errors carry none.
    pub fn line(&self) -> Option<u32> {
        match self {
            Error::Lex(e) => Some(e.line()),
            Error::Parse(e) => Some(e.line()),
            Error::Eval(_) => None,
        }
    }

    /// Structured report for this error against the source it came from.
    pub fn to_diagnostic(&self, source: &SourceFile) -> Diagnostic {
        let diagnostic = Diagnostic::new(&source.name, self.code(), self.to_string());
        match self.line() {
            Some(line) => {
                let text = source.line(line).unwrap_or_default();
                diagnostic.at_line(line, text)
            }
            None => diagnostic,
        }
    }
}

/// Lex and parse source text.
pub fn parse_source(source: &str) -> Result<Program, Error> {
    let tokens = cypher_lexer::tokenize(source)?;
    let program = cypher_parser::parse(tokens)?;
    Ok(program)
}

/// Output and result of a captured run.
#[derive(Debug)]
pub struct Outcome {
    /// Lines written by `flow`, including those written before a failure.
    pub output: Vec<String>,
    pub result: Result<Option<Value>, Error>,
}

/// Run source text with captured output, no input and default settings.
pub fn run(source: &str) -> Outcome {
    let mut host = CaptureHost::new();
    let result = run_with(source, &mut host, EvalConfig::default());
    Outcome {
        output: host.output,
        result,
    }
}

/// Run source text against `host`.
pub fn run_with(
    source: &str,
    host: &mut dyn Host,
    config: EvalConfig,
) -> Result<Option<Value>, Error> {
    debug!("running {} bytes of source", source.len());
    let program = parse_source(source)?;
    let mut interpreter = cypher_eval::Interpreter::new(host, config);
    let value = interpreter.run(&program)?;
    Ok(value)
}
