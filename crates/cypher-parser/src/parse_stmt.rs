//! Statement parsing.

use cypher_lexer::token::TokenKind;
use cypher_types::ast::*;
use cypher_types::ENTRY_POINT;

use crate::error::ParseResult;
use crate::parser::Parser;

impl Parser {
    /// Parse a block of statements: `{ stmts... }`
    pub(crate) fn parse_block(&mut self) -> ParseResult<Vec<Stmt>> {
        self.expect(TokenKind::LBrace)?;
        self.nested(|p| {
            let mut stmts = Vec::new();
            p.skip_newlines();
            while !p.check(TokenKind::RBrace) && !p.at_end() {
                stmts.push(p.parse_statement()?);
                p.skip_newlines();
            }
            p.expect(TokenKind::RBrace)?;
            Ok(stmts)
        })
    }

    /// Parse a single statement.
    pub(crate) fn parse_statement(&mut self) -> ParseResult<Stmt> {
        match self.peek_kind() {
            TokenKind::Spit => self.parse_var_decl(),
            TokenKind::Verse => self.parse_fn_decl(),
            TokenKind::Cypher => self.parse_entry_point(),
            TokenKind::Flow => self.parse_flow(),
            TokenKind::Battle => self.parse_battle(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Identifier if self.look_ahead(1) == TokenKind::Assign => {
                self.parse_assignment()
            }
            _ => Ok(Stmt::Expr(self.parse_expression()?)),
        }
    }

    /// `spit name = value`
    fn parse_var_decl(&mut self) -> ParseResult<Stmt> {
        self.advance(); // eat `spit`
        let name = self.expect_identifier()?;
        self.expect(TokenKind::Assign)?;
        let value = self.parse_expression()?;
        Ok(Stmt::VarDecl(VarDecl { name, value }))
    }

    /// `verse name(a, b) { body }`
    fn parse_fn_decl(&mut self) -> ParseResult<Stmt> {
        self.advance(); // eat `verse`
        let name = self.expect_identifier()?;
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                params.push(self.expect_identifier()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        let body = self.parse_block()?;
        Ok(Stmt::FnDecl(FnDecl { name, params, body }))
    }

    /// `cypher { body }`
    fn parse_entry_point(&mut self) -> ParseResult<Stmt> {
        self.advance(); // eat `cypher`
        let body = self.parse_block()?;
        Ok(Stmt::FnDecl(FnDecl {
            name: ENTRY_POINT.to_string(),
            params: Vec::new(),
            body,
        }))
    }

    /// `flow [expr, ...]`: a call to the output built-in.
    fn parse_flow(&mut self) -> ParseResult<Stmt> {
        let callee = self.advance().text; // eat `flow`
        let mut args = Vec::new();
        if !self.peek_kind().ends_statement() {
            loop {
                args.push(self.parse_expression()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        Ok(Stmt::Expr(Expr::Call { callee, args }))
    }

    /// `battle (cond) { ... } [defeat { ... }]`
    fn parse_battle(&mut self) -> ParseResult<Stmt> {
        self.advance(); // eat `battle`
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;
        let then_branch = self.parse_block()?;
        let else_branch = if self.eat_across_newlines(TokenKind::Defeat) {
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(Stmt::If(IfStmt {
            condition,
            then_branch,
            else_branch,
        }))
    }

    /// `return [expr]`
    fn parse_return(&mut self) -> ParseResult<Stmt> {
        self.advance(); // eat `return`
        let value = if self.peek_kind().ends_statement() {
            None
        } else {
            Some(self.parse_expression()?)
        };
        Ok(Stmt::Return(ReturnStmt { value }))
    }

    /// `name = value`
    fn parse_assignment(&mut self) -> ParseResult<Stmt> {
        let name = self.expect_identifier()?;
        self.expect(TokenKind::Assign)?;
        let value = self.parse_expression()?;
        Ok(Stmt::Assign(Assign { name, value }))
    }
}
