use serde::{Deserialize, Serialize};
use std::fmt;

/// Error category, determined by error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Lexical,
    Syntax,
    Runtime,
}

/// Numeric error code (E100–E399).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Lexical errors (E100–E199) ──
    pub const UNEXPECTED_CHARACTER: Self = Self(100);

    // ── Syntax errors (E200–E299) ──
    pub const UNEXPECTED_TOKEN: Self = Self(200);
    pub const INVALID_NUMBER: Self = Self(201);
    pub const NESTING_TOO_DEEP: Self = Self(202);

    // ── Runtime errors (E300–E399) ──
    pub const UNDEFINED_VARIABLE: Self = Self(300);
    pub const UNDEFINED_ASSIGNMENT: Self = Self(301);
    pub const ARITY_MISMATCH: Self = Self(302);
    pub const NOT_CALLABLE: Self = Self(303);
    pub const DIVISION_BY_ZERO: Self = Self(304);
    pub const TYPE_MISMATCH: Self = Self(305);
    pub const RECURSION_LIMIT: Self = Self(306);
    pub const IO: Self = Self(307);
    pub const STACK_OVERFLOW: Self = Self(308);

    /// Get the category for this error code.
    pub fn category(self) -> ErrorCategory {
        match self.0 {
            100..=199 => ErrorCategory::Lexical,
            200..=299 => ErrorCategory::Syntax,
            _ => ErrorCategory::Runtime,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lexical => write!(f, "lexical"),
            Self::Syntax => write!(f, "syntax"),
            Self::Runtime => write!(f, "runtime"),
        }
    }
}

/// A structured report of a failed run.
///
/// Lexical and syntax failures carry the offending line; runtime failures
/// have no source position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Source file name.
    pub file: String,
    /// Error code (e.g., E304).
    pub code: ErrorCode,
    /// Error category (derived from code).
    pub category: ErrorCategory,
    /// Human-readable error message.
    pub message: String,
    /// 1-based source line, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    /// The exact source line for context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_line: Option<String>,
}

impl Diagnostic {
    /// Create a diagnostic without a source position.
    pub fn new(file: impl Into<String>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            code,
            category: code.category(),
            message: message.into(),
            line: None,
            source_line: None,
        }
    }

    /// Attach a source position and the text of that line.
    pub fn at_line(mut self, line: u32, source_line: impl Into<String>) -> Self {
        self.line = Some(line);
        self.source_line = Some(source_line.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(
                f,
                "{}:{}: {} [{}] {}",
                self.file, line, self.code, self.category, self.message
            ),
            None => write!(
                f,
                "{}: {} [{}] {}",
                self.file, self.code, self.category, self.message
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_category() {
        assert_eq!(
            ErrorCode::UNEXPECTED_CHARACTER.category(),
            ErrorCategory::Lexical
        );
        assert_eq!(ErrorCode::UNEXPECTED_TOKEN.category(), ErrorCategory::Syntax);
        assert_eq!(ErrorCode::NESTING_TOO_DEEP.category(), ErrorCategory::Syntax);
        assert_eq!(ErrorCode::DIVISION_BY_ZERO.category(), ErrorCategory::Runtime);
        assert_eq!(ErrorCode::IO.category(), ErrorCategory::Runtime);
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(format!("{}", ErrorCode::UNEXPECTED_CHARACTER), "E100");
        assert_eq!(format!("{}", ErrorCode::ARITY_MISMATCH), "E302");
    }

    #[test]
    fn test_diagnostic_display_with_line() {
        let diag = Diagnostic::new("main.cyp", ErrorCode::UNEXPECTED_TOKEN, "expected ')'")
            .at_line(3, "flow (1 + 2");
        assert_eq!(
            diag.to_string(),
            "main.cyp:3: E200 [syntax] expected ')'"
        );
    }

    #[test]
    fn test_diagnostic_display_without_line() {
        let diag = Diagnostic::new("main.cyp", ErrorCode::DIVISION_BY_ZERO, "division by zero");
        assert_eq!(diag.to_string(), "main.cyp: E304 [runtime] division by zero");
        assert_eq!(diag.category, ErrorCategory::Runtime);
    }

    #[test]
    fn test_diagnostic_json_serialization() {
        let diag = Diagnostic::new("main.cyp", ErrorCode::UNEXPECTED_CHARACTER, "unexpected '@'")
            .at_line(2, "spit x = @");
        let json = serde_json::to_string(&diag).unwrap();
        assert!(json.contains("\"code\":100"));
        assert!(json.contains("\"category\":\"lexical\""));
        assert!(json.contains("\"line\":2"));
        assert!(json.contains("\"source_line\":\"spit x = @\""));

        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(back, diag);
    }

    #[test]
    fn test_runtime_diagnostic_omits_position() {
        let diag = Diagnostic::new("main.cyp", ErrorCode::NOT_CALLABLE, "'x' is not callable");
        let json = serde_json::to_string(&diag).unwrap();
        assert!(!json.contains("\"line\""));
        assert!(!json.contains("\"source_line\""));
    }
}
