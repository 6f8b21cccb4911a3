//! Runtime error types for the Cypher evaluator.

use std::fmt;
use std::io;

use cypher_types::ErrorCode;
use thiserror::Error;

/// Whether a missing name was read or assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Read => f.write_str("undefined variable"),
            Access::Write => f.write_str("assignment to undefined variable"),
        }
    }
}

/// Evaluation error. Every variant aborts the run.
///
/// `return` is not an error: it travels as a completion value.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("{access} '{name}'")]
    UndefinedVariable { name: String, access: Access },

    #[error("'{name}' expects {expected} argument(s), got {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("'{name}' is {type_name}, not a verse")]
    NotCallable {
        name: String,
        type_name: &'static str,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("cannot apply '{op}' to {}", operands(.left, .right))]
    TypeMismatch {
        op: &'static str,
        left: &'static str,
        /// `None` for unary operators.
        right: Option<&'static str>,
    },

    #[error("maximum call depth of {limit} exceeded")]
    RecursionLimit { limit: usize },

    #[error("evaluation nested deeper than {limit} levels")]
    StackOverflow { limit: usize },

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

fn operands(left: &str, right: &Option<&str>) -> String {
    match right {
        Some(right) => format!("{left} and {right}"),
        None => left.to_string(),
    }
}

impl EvalError {
    pub(crate) fn undefined(name: &str, access: Access) -> Self {
        EvalError::UndefinedVariable {
            name: name.to_string(),
            access,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            EvalError::UndefinedVariable {
                access: Access::Read,
                ..
            } => ErrorCode::UNDEFINED_VARIABLE,
            EvalError::UndefinedVariable {
                access: Access::Write,
                ..
            } => ErrorCode::UNDEFINED_ASSIGNMENT,
            EvalError::ArityMismatch { .. } => ErrorCode::ARITY_MISMATCH,
            EvalError::NotCallable { .. } => ErrorCode::NOT_CALLABLE,
            EvalError::DivisionByZero => ErrorCode::DIVISION_BY_ZERO,
            EvalError::TypeMismatch { .. } => ErrorCode::TYPE_MISMATCH,
            EvalError::RecursionLimit { .. } => ErrorCode::RECURSION_LIMIT,
            EvalError::StackOverflow { .. } => ErrorCode::STACK_OVERFLOW,
            EvalError::Io(_) => ErrorCode::IO,
        }
    }
}

/// Result alias for evaluator operations.
pub type EvalResult<T> = Result<T, EvalError>;
