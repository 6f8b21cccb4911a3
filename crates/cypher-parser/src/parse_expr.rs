//! Expression parsing with operator precedence.
//!
//! Precedence (lowest → highest):
//! 4. `==`, `>`, `<` (left-associative)
//! 3. `+`, `-`
//! 2. `*`, `/`
//! 1. literals, identifiers, `( expr )`, calls, unary `-`

use cypher_lexer::token::TokenKind;
use cypher_types::ast::*;

use crate::error::{Expected, ParseError, ParseResult};
use crate::parser::Parser;

impl Parser {
    // ══════════════════════════════════════════════════════════════════════════
    // Entry Point
    // ══════════════════════════════════════════════════════════════════════════

    /// Parse an expression.
    pub(crate) fn parse_expression(&mut self) -> ParseResult<Expr> {
        self.nested(|p| p.parse_comparison())
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Precedence Chain
    // ══════════════════════════════════════════════════════════════════════════

    /// `Comparison = Additive { ("==" | ">" | "<") Additive }`
    fn parse_comparison(&mut self) -> ParseResult<Expr> {
        self.left_fold(Self::parse_additive, |kind| match kind {
            TokenKind::Equals => Some(BinOp::Eq),
            TokenKind::Greater => Some(BinOp::Greater),
            TokenKind::Less => Some(BinOp::Less),
            _ => None,
        })
    }

    /// `Additive = Multiplicative { ("+" | "-") Multiplicative }`
    fn parse_additive(&mut self) -> ParseResult<Expr> {
        self.left_fold(Self::parse_multiplicative, |kind| match kind {
            TokenKind::Plus => Some(BinOp::Add),
            TokenKind::Minus => Some(BinOp::Sub),
            _ => None,
        })
    }

    /// `Multiplicative = Primary { ("*" | "/") Primary }`
    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        self.left_fold(Self::parse_primary, |kind| match kind {
            TokenKind::Star => Some(BinOp::Mul),
            TokenKind::Slash => Some(BinOp::Div),
            _ => None,
        })
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Primary Expressions
    // ══════════════════════════════════════════════════════════════════════════

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        match self.peek_kind() {
            TokenKind::Number => {
                let token = self.advance();
                number_literal(&token.text, token.line).map(Expr::Literal)
            }
            TokenKind::String => Ok(Expr::Literal(Literal::Text(self.advance().text))),
            TokenKind::True => {
                self.advance();
                Ok(Expr::Literal(Literal::Bool(true)))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Literal(Literal::Bool(false)))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Expr::Literal(Literal::Null))
            }
            TokenKind::Identifier => {
                let name = self.advance().text;
                if self.check(TokenKind::LParen) {
                    let args = self.parse_call_args()?;
                    Ok(Expr::Call { callee: name, args })
                } else {
                    Ok(Expr::Identifier(name))
                }
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Minus => {
                self.advance();
                self.nested(|p| p.parse_primary().map(Expr::neg))
            }
            _ => Err(self.unexpected(Expected::Expression)),
        }
    }

    /// `( [expr {, expr}] )`
    fn parse_call_args(&mut self) -> ParseResult<Vec<Expr>> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(args)
    }
}

/// Convert the raw digit/dot run of a number token into a literal.
///
/// Integers that do not fit in `i64` fall back to `Float`. Literals too
/// large for a finite `f64` are rejected.
fn number_literal(text: &str, line: u32) -> ParseResult<Literal> {
    let invalid = || ParseError::InvalidNumber {
        text: text.to_string(),
        line,
    };
    if !text.contains('.') {
        if let Ok(n) = text.parse::<i64>() {
            return Ok(Literal::Int(n));
        }
    }
    match text.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(Literal::Float(n)),
        _ => Err(invalid()),
    }
}
