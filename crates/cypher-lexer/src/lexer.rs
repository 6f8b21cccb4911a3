//! Core lexer: converts source text to a token stream.
//!
//! Features:
//! - 12 reserved words, 13 operator/punctuation symbols, literals
//! - Single-line comments stripped (`//`)
//! - Strings quoted with `"` or `'`, closed only by the opening quote
//! - Newlines emitted as tokens (the parser skips them between statements)
//! - Fails on the first character that starts no token

use cypher_types::ErrorCode;
use log::debug;
use thiserror::Error;

use crate::token::{Token, TokenKind};

/// Lexing failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unexpected character '{ch}' on line {line}")]
    UnexpectedCharacter { ch: char, line: u32 },
}

impl LexError {
    /// 1-based line of the failure.
    pub fn line(&self) -> u32 {
        match self {
            LexError::UnexpectedCharacter { line, .. } => *line,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            LexError::UnexpectedCharacter { .. } => ErrorCode::UNEXPECTED_CHARACTER,
        }
    }
}

/// Result alias for lexing.
pub type LexResult<T> = Result<T, LexError>;

/// Tokenize a complete source text. The stream always ends with one `Eof`.
pub fn tokenize(source: &str) -> LexResult<Vec<Token>> {
    Lexer::new(source).lex()
}

/// The Cypher lexer.
pub struct Lexer<'src> {
    /// The full source text.
    source: &'src str,
    /// Current byte offset into `source`.
    pos: usize,
    /// Current line number (1-based).
    line: u32,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer over the given source text.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
        }
    }

    /// Lex the entire source into a token stream.
    pub fn lex(mut self) -> LexResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.scan_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        debug!("lexed {} tokens over {} lines", tokens.len(), self.line);
        Ok(tokens)
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.source[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
        }
        Some(ch)
    }

    /// Consume characters while `pred` holds.
    fn advance_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            self.advance();
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Whitespace & comments
    // ─────────────────────────────────────────────────────────────

    /// Skip spaces, tabs, carriage returns, and `//` comments.
    /// Newlines are left in place: they are tokens.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(' ' | '\t' | '\r') => {
                    self.advance();
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    self.advance_while(|ch| ch != '\n');
                }
                _ => return,
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Scanning
    // ─────────────────────────────────────────────────────────────

    /// Scan one token.
    fn scan_token(&mut self) -> LexResult<Token> {
        self.skip_trivia();

        let line = self.line;
        let start = self.pos;
        let Some(ch) = self.advance() else {
            return Ok(Token::new(TokenKind::Eof, "", line));
        };

        let kind = match ch {
            '\n' => TokenKind::Newline,
            '"' | '\'' => return Ok(self.scan_string(ch, line)),
            c if c.is_ascii_digit() => {
                self.advance_while(|c| c.is_ascii_digit() || c == '.');
                TokenKind::Number
            }
            c if c.is_alphabetic() || c == '_' => {
                self.advance_while(|c| c.is_alphanumeric() || c == '_');
                TokenKind::from_keyword(&self.source[start..self.pos])
                    .unwrap_or(TokenKind::Identifier)
            }
            '=' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::Equals
                } else {
                    TokenKind::Assign
                }
            }
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '>' => TokenKind::Greater,
            '<' => TokenKind::Less,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ',' => TokenKind::Comma,
            ch => return Err(LexError::UnexpectedCharacter { ch, line }),
        };

        Ok(Token::new(kind, &self.source[start..self.pos], line))
    }

    /// Scan a string literal after its opening `quote`.
    ///
    /// An unterminated string ends at end of input with whatever was read.
    fn scan_string(&mut self, quote: char, line: u32) -> Token {
        let mut buf = String::new();
        while let Some(ch) = self.advance() {
            if ch == quote {
                return Token::new(TokenKind::String, buf, line);
            }
            if ch != '\\' {
                buf.push(ch);
                continue;
            }
            match self.advance() {
                Some('n') => buf.push('\n'),
                Some('t') => buf.push('\t'),
                // `\\`, the active quote, and anything else: the character itself
                Some(other) => buf.push(other),
                None => break,
            }
        }
        Token::new(TokenKind::String, buf, line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eof_only_for_empty_input() {
        let tokens = tokenize("").unwrap();
        assert_eq!(tokens, vec![Token::new(TokenKind::Eof, "", 1)]);
    }

    #[test]
    fn test_number_text_is_raw() {
        let tokens = tokenize("3.14").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].text, "3.14");
    }

    #[test]
    fn test_error_line() {
        let err = tokenize("flow 1\nflow @").unwrap_err();
        assert_eq!(err, LexError::UnexpectedCharacter { ch: '@', line: 2 });
        assert_eq!(err.line(), 2);
    }
}
