//! AST node types for the Cypher language.
//!
//! Every node owns its children: the tree has no sharing and no cycles.
//! Large recursive types are boxed to keep enum sizes reasonable.
//! Nodes are built by the parser and never mutated afterwards.

use std::fmt;

use crate::ENTRY_POINT;

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// A complete program: top-level statements in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub stmts: Vec<Stmt>,
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `spit name = value`
    VarDecl(VarDecl),
    /// `verse name(params) { body }` or `cypher { body }`
    FnDecl(FnDecl),
    /// `name = value`
    Assign(Assign),
    /// `battle (condition) { ... } defeat { ... }`
    If(IfStmt),
    /// `return [value]`
    Return(ReturnStmt),
    /// A bare expression, including `flow` and plain calls.
    Expr(Expr),
}

/// `spit name = value`
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: String,
    pub value: Expr,
}

/// A named function declaration.
///
/// The entry point is an ordinary declaration named [`ENTRY_POINT`] with no
/// parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct FnDecl {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
}

impl FnDecl {
    /// Returns `true` if this is the `cypher { ... }` entry point.
    pub fn is_entry_point(&self) -> bool {
        self.name == ENTRY_POINT && self.params.is_empty()
    }
}

/// `name = value`: rebinds an existing variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Assign {
    pub name: String,
    pub value: Expr,
}

/// `battle (condition) { then } [defeat { else }]`
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_branch: Vec<Stmt>,
    pub else_branch: Option<Vec<Stmt>>,
}

/// `return [value]`
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Identifier(String),
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// `callee(args)`, also produced by the `flow` statement.
    Call {
        callee: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    pub fn binary(left: Expr, op: BinOp, right: Expr) -> Self {
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn neg(operand: Expr) -> Self {
        Expr::Unary {
            op: UnaryOp::Neg,
            operand: Box::new(operand),
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Greater,
    Less,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Eq => "==",
            BinOp::Greater => ">",
            BinOp::Less => "<",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
}

/// Literal values as written in source.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    Null,
}

// ══════════════════════════════════════════════════════════════════════════════
// Canonical printing
// ══════════════════════════════════════════════════════════════════════════════
//
// The printed form re-parses to the same tree: binary operations are fully
// parenthesized and floats always keep a fractional part.

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.stmts {
            write_stmt(f, stmt, 0)?;
        }
        Ok(())
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_stmt(f, self, 0)
    }
}

fn write_stmt(f: &mut fmt::Formatter<'_>, stmt: &Stmt, indent: usize) -> fmt::Result {
    let pad = "    ".repeat(indent);
    match stmt {
        Stmt::VarDecl(decl) => writeln!(f, "{pad}spit {} = {}", decl.name, decl.value),
        Stmt::FnDecl(decl) if decl.is_entry_point() => {
            write!(f, "{pad}cypher ")?;
            write_block(f, &decl.body, indent)?;
            writeln!(f)
        }
        Stmt::FnDecl(decl) => {
            write!(f, "{pad}verse {}({}) ", decl.name, decl.params.join(", "))?;
            write_block(f, &decl.body, indent)?;
            writeln!(f)
        }
        Stmt::Assign(assign) => writeln!(f, "{pad}{} = {}", assign.name, assign.value),
        Stmt::If(if_stmt) => {
            write!(f, "{pad}battle ({}) ", if_stmt.condition)?;
            write_block(f, &if_stmt.then_branch, indent)?;
            if let Some(else_branch) = &if_stmt.else_branch {
                write!(f, " defeat ")?;
                write_block(f, else_branch, indent)?;
            }
            writeln!(f)
        }
        Stmt::Return(ret) => match &ret.value {
            Some(value) => writeln!(f, "{pad}return {value}"),
            None => writeln!(f, "{pad}return"),
        },
        Stmt::Expr(Expr::Call { callee, args }) if callee == "flow" => {
            write!(f, "{pad}flow")?;
            for (i, arg) in args.iter().enumerate() {
                let sep = if i == 0 { " " } else { ", " };
                write!(f, "{sep}{arg}")?;
            }
            writeln!(f)
        }
        Stmt::Expr(expr) => writeln!(f, "{pad}{expr}"),
    }
}

fn write_block(f: &mut fmt::Formatter<'_>, stmts: &[Stmt], indent: usize) -> fmt::Result {
    writeln!(f, "{{")?;
    for stmt in stmts {
        write_stmt(f, stmt, indent + 1)?;
    }
    write!(f, "{}}}", "    ".repeat(indent))
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(lit) => write!(f, "{lit}"),
            Expr::Identifier(name) => f.write_str(name),
            Expr::Binary { left, op, right } => write!(f, "({left} {} {right})", op.symbol()),
            Expr::Unary {
                op: UnaryOp::Neg,
                operand,
            } => write!(f, "-{operand}"),
            Expr::Call { callee, args } => {
                write!(f, "{callee}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(n) => write!(f, "{n}"),
            Literal::Float(n) if n.fract() == 0.0 && n.is_finite() => write!(f, "{n:.1}"),
            Literal::Float(n) => write!(f, "{n}"),
            Literal::Text(s) => {
                f.write_str("\"")?;
                for ch in s.chars() {
                    match ch {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\t' => f.write_str("\\t")?,
                        c => write!(f, "{c}")?,
                    }
                }
                f.write_str("\"")
            }
            Literal::Bool(true) => f.write_str("true"),
            Literal::Bool(false) => f.write_str("false"),
            Literal::Null => f.write_str("null"),
        }
    }
}
