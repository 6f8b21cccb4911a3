//! Core parser infrastructure: token cursor, error construction, helpers.

use cypher_lexer::token::{Token, TokenKind};
use cypher_types::ast::{BinOp, Expr, Program};
use log::debug;

use crate::error::{Expected, ParseError, ParseResult};

/// Maximum nesting of expressions and blocks. Every binary operator in a
/// chain counts as one level.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Parse a complete token stream into a [`Program`].
pub fn parse(tokens: Vec<Token>) -> ParseResult<Program> {
    Parser::new(tokens).parse()
}

/// The Cypher parser.
///
/// Single pass recursive descent over a token stream produced by the lexer.
/// There is no recovery: the first error aborts.
pub struct Parser {
    /// The token stream. Always ends with `Eof`.
    tokens: Vec<Token>,
    /// Current index into `tokens`.
    pos: usize,
    /// Current nesting depth of expressions and blocks.
    depth: usize,
}

impl Parser {
    /// Create a new parser from a token stream.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last(), Some(t) if t.kind == TokenKind::Eof) {
            let line = tokens.last().map_or(1, |t| t.line);
            tokens.push(Token::new(TokenKind::Eof, "", line));
        }
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    /// Returns the current token without advancing.
    pub(crate) fn peek(&self) -> &Token {
        let idx = self.pos.min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    /// Returns the kind of the current token.
    pub(crate) fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    /// Look ahead by `n` tokens from the current position.
    pub(crate) fn look_ahead(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map_or(TokenKind::Eof, |t| t.kind)
    }

    /// Advance the cursor by one and return the consumed token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    /// Returns `true` if the current token is `Eof`.
    pub(crate) fn at_end(&self) -> bool {
        self.peek_kind() == TokenKind::Eof
    }

    /// Check if the current token has the given kind.
    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// If the current token matches, advance and return `true`.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    // ── Newline Handling ──────────────────────────────────────────────────────

    /// Skip all consecutive newline tokens.
    pub(crate) fn skip_newlines(&mut self) {
        while self.check(TokenKind::Newline) {
            self.advance();
        }
    }

    /// If the next non-newline token has the given kind, skip the newlines
    /// and consume it.
    pub(crate) fn eat_across_newlines(&mut self, kind: TokenKind) -> bool {
        let mut n = 0;
        while self.look_ahead(n) == TokenKind::Newline {
            n += 1;
        }
        if self.look_ahead(n) != kind {
            return false;
        }
        self.skip_newlines();
        self.advance();
        true
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    /// Expect a specific token kind.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(Expected::Token(kind)))
        }
    }

    /// Expect an identifier token and return its name.
    pub(crate) fn expect_identifier(&mut self) -> ParseResult<String> {
        self.expect(TokenKind::Identifier).map(|t| t.text)
    }

    // ── Errors & Limits ───────────────────────────────────────────────────────

    /// Build an error for the current token.
    pub(crate) fn unexpected(&self, expected: Expected) -> ParseError {
        let token = self.peek();
        ParseError::UnexpectedToken {
            expected,
            found: token.kind,
            line: token.line,
        }
    }

    /// Run `f` one nesting level deeper, failing past [`MAX_NESTING_DEPTH`].
    pub(crate) fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        self.descend()?;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Parse `operand { op operand }` into a left-deep tree.
    ///
    /// Each operator adds a level to the tree, so each one counts against
    /// [`MAX_NESTING_DEPTH`] until the chain ends.
    pub(crate) fn left_fold(
        &mut self,
        operand: fn(&mut Self) -> ParseResult<Expr>,
        operator: fn(TokenKind) -> Option<BinOp>,
    ) -> ParseResult<Expr> {
        let start = self.depth;
        let result = self.fold_operands(operand, operator);
        self.depth = start;
        result
    }

    fn fold_operands(
        &mut self,
        operand: fn(&mut Self) -> ParseResult<Expr>,
        operator: fn(TokenKind) -> Option<BinOp>,
    ) -> ParseResult<Expr> {
        let mut left = operand(self)?;
        while let Some(op) = operator(self.peek_kind()) {
            self.descend()?;
            self.advance();
            let right = operand(self)?;
            left = Expr::binary(left, op, right);
        }
        Ok(left)
    }

    fn descend(&mut self) -> ParseResult<()> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
                line: self.peek().line,
            });
        }
        self.depth += 1;
        Ok(())
    }

    // ── Public API ────────────────────────────────────────────────────────────

    /// Parse the token stream into a `Program` AST.
    pub fn parse(mut self) -> ParseResult<Program> {
        let mut stmts = Vec::new();
        self.skip_newlines();
        while !self.at_end() {
            stmts.push(self.parse_statement()?);
            self.skip_newlines();
        }
        debug!("parsed {} top-level statements", stmts.len());
        Ok(Program { stmts })
    }
}
