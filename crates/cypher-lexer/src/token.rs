//! Token types for the Cypher lexer.
//!
//! Defines [`TokenKind`] covering every lexeme in the language and
//! [`Token`], which pairs a kind with its lexeme text and source line.

use std::fmt;

/// All 12 reserved words.
///
/// `versus` and `loop` are reserved but no statement accepts them.
pub const ALL_KEYWORDS: &[&str] = &[
    // Statements (9)
    "spit", "verse", "cypher", "flow", "battle", "versus", "defeat", "return", "loop",
    // Literals (3)
    "true", "false", "null",
];

// ─────────────────────────────────────────────────────────────────────
// Token
// ─────────────────────────────────────────────────────────────────────

/// A single token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What kind of token this is.
    pub kind: TokenKind,
    /// The lexeme. Unescaped content for strings, raw text otherwise.
    pub text: String,
    /// 1-based source line.
    pub line: u32,
}

impl Token {
    /// Create a new token.
    pub fn new(kind: TokenKind, text: impl Into<String>, line: u32) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
        }
    }

    /// Returns `true` if this token is a reserved keyword.
    pub fn is_keyword(&self) -> bool {
        self.kind.is_keyword()
    }
}

// ─────────────────────────────────────────────────────────────────────
// TokenKind
// ─────────────────────────────────────────────────────────────────────

/// Every token kind in the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // ── Literals ──────────────────────────────────────────────

    /// `"text"` or `'text'`
    String,
    /// `42`, `3.14`
    Number,
    /// `true`
    True,
    /// `false`
    False,
    /// `null`
    Null,

    // ── Keywords ─────────────────────────────────────────────

    /// `spit` (variable declaration)
    Spit,
    /// `verse` (function declaration)
    Verse,
    /// `cypher` (entry point)
    Cypher,
    /// `flow` (output)
    Flow,
    /// `battle` (conditional)
    Battle,
    /// `versus` (reserved)
    Versus,
    /// `defeat` (else branch)
    Defeat,
    /// `return`
    Return,
    /// `loop` (reserved)
    Loop,

    // ── Operators ────────────────────────────────────────────

    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `=`
    Assign,
    /// `==`
    Equals,
    /// `>`
    Greater,
    /// `<`
    Less,

    // ── Punctuation ──────────────────────────────────────────

    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `,`
    Comma,

    // ── Special ──────────────────────────────────────────────

    /// User-defined name: `total`, `_tmp`
    Identifier,
    /// Newline (skippable statement separator)
    Newline,
    /// End of input
    Eof,
}

impl TokenKind {
    /// Look up a reserved word. Returns `None` for user identifiers.
    pub fn from_keyword(s: &str) -> Option<TokenKind> {
        Some(match s {
            "spit" => TokenKind::Spit,
            "verse" => TokenKind::Verse,
            "cypher" => TokenKind::Cypher,
            "flow" => TokenKind::Flow,
            "battle" => TokenKind::Battle,
            "versus" => TokenKind::Versus,
            "defeat" => TokenKind::Defeat,
            "return" => TokenKind::Return,
            "loop" => TokenKind::Loop,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            _ => return None,
        })
    }

    /// Returns `true` if this token kind is a reserved word.
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Spit
                | TokenKind::Verse
                | TokenKind::Cypher
                | TokenKind::Flow
                | TokenKind::Battle
                | TokenKind::Versus
                | TokenKind::Defeat
                | TokenKind::Return
                | TokenKind::Loop
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
        )
    }

    /// Returns `true` for tokens that end a statement when an optional
    /// operand is omitted (`return`, `flow`).
    pub fn ends_statement(&self) -> bool {
        matches!(self, TokenKind::Newline | TokenKind::RBrace | TokenKind::Eof)
    }

    /// Human-readable description for error messages: token classes are
    /// named, fixed lexemes are quoted.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::String
            | TokenKind::Number
            | TokenKind::Identifier
            | TokenKind::Newline
            | TokenKind::Eof => self.to_string(),
            _ => format!("'{self}'"),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Literals
            TokenKind::String => f.write_str("string"),
            TokenKind::Number => f.write_str("number"),
            TokenKind::True => f.write_str("true"),
            TokenKind::False => f.write_str("false"),
            TokenKind::Null => f.write_str("null"),
            // Keywords display their source text
            TokenKind::Spit => f.write_str("spit"),
            TokenKind::Verse => f.write_str("verse"),
            TokenKind::Cypher => f.write_str("cypher"),
            TokenKind::Flow => f.write_str("flow"),
            TokenKind::Battle => f.write_str("battle"),
            TokenKind::Versus => f.write_str("versus"),
            TokenKind::Defeat => f.write_str("defeat"),
            TokenKind::Return => f.write_str("return"),
            TokenKind::Loop => f.write_str("loop"),
            // Operators
            TokenKind::Plus => f.write_str("+"),
            TokenKind::Minus => f.write_str("-"),
            TokenKind::Star => f.write_str("*"),
            TokenKind::Slash => f.write_str("/"),
            TokenKind::Assign => f.write_str("="),
            TokenKind::Equals => f.write_str("=="),
            TokenKind::Greater => f.write_str(">"),
            TokenKind::Less => f.write_str("<"),
            // Punctuation
            TokenKind::LParen => f.write_str("("),
            TokenKind::RParen => f.write_str(")"),
            TokenKind::LBrace => f.write_str("{"),
            TokenKind::RBrace => f.write_str("}"),
            TokenKind::Comma => f.write_str(","),
            // Special
            TokenKind::Identifier => f.write_str("identifier"),
            TokenKind::Newline => f.write_str("newline"),
            TokenKind::Eof => f.write_str("end of file"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
