//! Core statement and expression evaluator.

use std::cmp::Ordering;
use std::rc::Rc;

use cypher_types::ast::*;
use cypher_types::ENTRY_POINT;
use log::{debug, trace};

use crate::env::{self, Environment, WeakEnvironment};
use crate::error::{Access, EvalError, EvalResult};
use crate::host::Host;
use crate::value::{Builtin, Function, Value};

/// Call depth allowed when no other limit is configured.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 200;

/// Combined nesting of expressions and blocks, across all active calls,
/// allowed when no other limit is configured.
pub const DEFAULT_MAX_EVAL_DEPTH: usize = 1024;

/// Interpreter settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalConfig {
    /// Maximum number of nested user function calls.
    pub max_call_depth: usize,
    /// Maximum number of nested expressions and blocks being evaluated
    /// at once. Bounds the host stack used by a run.
    pub max_eval_depth: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            max_eval_depth: DEFAULT_MAX_EVAL_DEPTH,
        }
    }
}

impl EvalConfig {
    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }

    pub fn with_max_eval_depth(mut self, max_eval_depth: usize) -> Self {
        self.max_eval_depth = max_eval_depth;
        self
    }
}

/// How a statement or block finished.
#[derive(Debug)]
enum Flow {
    Normal,
    Return(Value),
}

/// The tree-walking interpreter. One value per run.
pub struct Interpreter<'h> {
    /// Global scope, pre-bound with the built-ins.
    globals: Environment,
    host: &'h mut dyn Host,
    config: EvalConfig,
    /// Current number of active user function calls.
    depth: usize,
    /// Current nesting of expressions and blocks.
    eval_depth: usize,
    /// Block and call scopes that may still be alive, oldest first.
    scopes: Vec<WeakEnvironment>,
}

impl<'h> Interpreter<'h> {
    pub fn new(host: &'h mut dyn Host, config: EvalConfig) -> Self {
        let globals = Environment::new();
        for builtin in Builtin::ALL {
            globals.define(builtin.name(), Value::Builtin(builtin));
        }
        Self {
            globals,
            host,
            config,
            depth: 0,
            eval_depth: 0,
            scopes: Vec::new(),
        }
    }

    /// Run a program: execute the top-level statements, then the entry
    /// point if one was declared.
    ///
    /// Returns the value of a top-level `return` or of an early `return`
    /// inside the entry point, and `None` otherwise.
    pub fn run(&mut self, program: &Program) -> EvalResult<Option<Value>> {
        debug!("executing {} top-level statements", program.stmts.len());
        let globals = self.globals.clone();
        if let Flow::Return(value) = self.exec_block(&program.stmts, &globals)? {
            debug!("top-level return, skipping entry point");
            return Ok(Some(value));
        }

        let Some(Value::Function(entry)) = globals.get(ENTRY_POINT) else {
            debug!("no entry point declared");
            return Ok(None);
        };
        debug!("dispatching entry point");
        match self.invoke(&entry, Vec::new())? {
            Flow::Return(value) => Ok(Some(value)),
            Flow::Normal => Ok(None),
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Statements
    // ══════════════════════════════════════════════════════════════════════

    fn exec_block(&mut self, stmts: &[Stmt], env: &Environment) -> EvalResult<Flow> {
        self.nested(|this| {
            for stmt in stmts {
                if let Flow::Return(value) = this.exec_stmt(stmt, env)? {
                    return Ok(Flow::Return(value));
                }
            }
            Ok(Flow::Normal)
        })
    }

    fn exec_stmt(&mut self, stmt: &Stmt, env: &Environment) -> EvalResult<Flow> {
        match stmt {
            Stmt::VarDecl(decl) => {
                let value = self.eval(&decl.value, env)?;
                env.define(&decl.name, value);
            }
            Stmt::FnDecl(decl) => self.declare_function(decl, env),
            Stmt::Assign(assign) => {
                let value = self.eval(&assign.value, env)?;
                if !env.set(&assign.name, value) {
                    return Err(EvalError::undefined(&assign.name, Access::Write));
                }
            }
            Stmt::If(if_stmt) => {
                let branch = if self.eval(&if_stmt.condition, env)?.is_truthy() {
                    Some(&if_stmt.then_branch)
                } else {
                    if_stmt.else_branch.as_ref()
                };
                if let Some(stmts) = branch {
                    let scope = self.child_scope(env);
                    return self.exec_block(stmts, &scope);
                }
            }
            Stmt::Return(ret) => {
                let value = match &ret.value {
                    Some(expr) => self.eval(expr, env)?,
                    None => Value::Null,
                };
                return Ok(Flow::Return(value));
            }
            Stmt::Expr(expr) => {
                self.eval(expr, env)?;
            }
        }
        Ok(Flow::Normal)
    }

    fn declare_function(&mut self, decl: &FnDecl, env: &Environment) {
        let function = Function {
            name: decl.name.clone(),
            params: decl.params.clone(),
            body: decl.body.clone(),
            closure: env.clone(),
        };
        env.define(&decl.name, Value::Function(Rc::new(function)));
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expressions
    // ══════════════════════════════════════════════════════════════════════

    fn eval(&mut self, expr: &Expr, env: &Environment) -> EvalResult<Value> {
        self.nested(|this| this.eval_expr(expr, env))
    }

    fn eval_expr(&mut self, expr: &Expr, env: &Environment) -> EvalResult<Value> {
        match expr {
            Expr::Literal(lit) => Ok(literal_value(lit)),
            Expr::Identifier(name) => env
                .get(name)
                .ok_or_else(|| EvalError::undefined(name, Access::Read)),
            Expr::Binary { left, op, right } => {
                let left = self.eval(left, env)?;
                let right = self.eval(right, env)?;
                binary_op(*op, left, right)
            }
            Expr::Unary {
                op: UnaryOp::Neg,
                operand,
            } => negate(self.eval(operand, env)?),
            Expr::Call { callee, args } => self.eval_call(callee, args, env),
        }
    }

    fn eval_args(&mut self, args: &[Expr], env: &Environment) -> EvalResult<Vec<Value>> {
        args.iter().map(|arg| self.eval(arg, env)).collect()
    }

    // ── Calls ────────────────────────────────────────────────────────────

    fn eval_call(&mut self, name: &str, args: &[Expr], env: &Environment) -> EvalResult<Value> {
        let callee = env
            .get(name)
            .ok_or_else(|| EvalError::undefined(name, Access::Read))?;
        match callee {
            Value::Builtin(builtin) => {
                let values = self.eval_args(args, env)?;
                self.call_builtin(builtin, values)
            }
            Value::Function(function) => {
                if args.len() != function.params.len() {
                    return Err(EvalError::ArityMismatch {
                        name: name.to_string(),
                        expected: function.params.len(),
                        found: args.len(),
                    });
                }
                let values = self.eval_args(args, env)?;
                match self.invoke(&function, values)? {
                    Flow::Return(value) => Ok(value),
                    Flow::Normal => Ok(Value::Null),
                }
            }
            other => Err(EvalError::NotCallable {
                name: name.to_string(),
                type_name: other.type_name(),
            }),
        }
    }

    /// Run a user function body in a fresh child of its captured scope.
    fn invoke(&mut self, function: &Function, args: Vec<Value>) -> EvalResult<Flow> {
        if self.depth >= self.config.max_call_depth {
            return Err(EvalError::RecursionLimit {
                limit: self.config.max_call_depth,
            });
        }
        trace!(
            "call {}({} args) at depth {}",
            function.name,
            args.len(),
            self.depth
        );
        let mark = self.scopes.len();
        let scope = self.child_scope(&function.closure);
        for (param, arg) in function.params.iter().zip(args) {
            scope.define(param, arg);
        }
        self.depth += 1;
        let result = self.exec_block(&function.body, &scope);
        self.depth -= 1;
        drop(scope);
        self.release_scopes(mark);
        result
    }

    fn call_builtin(&mut self, builtin: Builtin, args: Vec<Value>) -> EvalResult<Value> {
        trace!("builtin {} with {} args", builtin.name(), args.len());
        match builtin {
            Builtin::Flow => {
                let line = args
                    .iter()
                    .map(Value::to_string)
                    .collect::<Vec<_>>()
                    .join(" ");
                self.host.write_line(&line)?;
                Ok(Value::Null)
            }
            Builtin::Listen => {
                if !args.is_empty() {
                    return Err(EvalError::ArityMismatch {
                        name: builtin.name().to_string(),
                        expected: 0,
                        found: args.len(),
                    });
                }
                Ok(self.host.read_line()?.map_or(Value::Null, Value::Text))
            }
        }
    }

    // ── Limits & scopes ──────────────────────────────────────────────────

    /// Run `f` one expression or block level deeper.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> EvalResult<T>) -> EvalResult<T> {
        if self.eval_depth >= self.config.max_eval_depth {
            return Err(EvalError::StackOverflow {
                limit: self.config.max_eval_depth,
            });
        }
        self.eval_depth += 1;
        let result = f(self);
        self.eval_depth -= 1;
        result
    }

    fn child_scope(&mut self, parent: &Environment) -> Environment {
        let scope = parent.child();
        self.scopes.push(scope.downgrade());
        scope
    }

    /// Free the scopes created since `mark` that are only kept alive by
    /// reference cycles among themselves.
    fn release_scopes(&mut self, mark: usize) {
        let candidates: Vec<Environment> = self
            .scopes
            .drain(mark..)
            .filter_map(|weak| weak.upgrade())
            .collect();
        if candidates.is_empty() {
            return;
        }
        let created = candidates.len();
        let survivors = env::sweep(candidates);
        trace!("released {} of {} scopes", created - survivors.len(), created);
        self.scopes.extend(survivors.iter().map(Environment::downgrade));
    }
}

impl Drop for Interpreter<'_> {
    fn drop(&mut self) {
        for weak in self.scopes.drain(..) {
            if let Some(env) = weak.upgrade() {
                env.clear();
            }
        }
        self.globals.clear();
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Operators
// ══════════════════════════════════════════════════════════════════════════

fn literal_value(lit: &Literal) -> Value {
    match lit {
        Literal::Int(n) => Value::Int(*n),
        Literal::Float(n) => Value::Float(*n),
        Literal::Text(s) => Value::Text(s.clone()),
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Null => Value::Null,
    }
}

fn mismatch(op: BinOp, left: &Value, right: &Value) -> EvalError {
    EvalError::TypeMismatch {
        op: op.symbol(),
        left: left.type_name(),
        right: Some(right.type_name()),
    }
}

fn binary_op(op: BinOp, left: Value, right: Value) -> EvalResult<Value> {
    match op {
        BinOp::Add => {
            if matches!(left, Value::Text(_)) || matches!(right, Value::Text(_)) {
                Ok(Value::Text(format!("{left}{right}")))
            } else {
                arithmetic(op, &left, &right, i64::checked_add, |a, b| a + b)
            }
        }
        BinOp::Sub => arithmetic(op, &left, &right, i64::checked_sub, |a, b| a - b),
        BinOp::Mul => arithmetic(op, &left, &right, i64::checked_mul, |a, b| a * b),
        BinOp::Div => {
            let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) else {
                return Err(mismatch(op, &left, &right));
            };
            if b == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            Ok(Value::Float(a / b))
        }
        BinOp::Eq => Ok(Value::Bool(left == right)),
        BinOp::Greater => {
            let ordering = compare(op, &left, &right)?;
            Ok(Value::Bool(ordering == Some(Ordering::Greater)))
        }
        BinOp::Less => {
            let ordering = compare(op, &left, &right)?;
            Ok(Value::Bool(ordering == Some(Ordering::Less)))
        }
    }
}

/// Integer arithmetic when both sides are `Int` and the result fits,
/// floating point otherwise.
fn arithmetic(
    op: BinOp,
    left: &Value,
    right: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> EvalResult<Value> {
    if let (Value::Int(a), Value::Int(b)) = (left, right) {
        if let Some(n) = int_op(*a, *b) {
            return Ok(Value::Int(n));
        }
    }
    match (left.as_f64(), right.as_f64()) {
        (Some(a), Some(b)) => Ok(Value::Float(float_op(a, b))),
        _ => Err(mismatch(op, left, right)),
    }
}

/// Ordering for `>` and `<`. `None` when a float comparison involves NaN.
fn compare(op: BinOp, left: &Value, right: &Value) -> EvalResult<Option<Ordering>> {
    match (left, right) {
        (Value::Text(a), Value::Text(b)) => Ok(Some(a.cmp(b))),
        (Value::Int(a), Value::Int(b)) => Ok(Some(a.cmp(b))),
        _ => match (left.as_f64(), right.as_f64()) {
            (Some(a), Some(b)) => Ok(a.partial_cmp(&b)),
            _ => Err(mismatch(op, left, right)),
        },
    }
}

fn negate(value: Value) -> EvalResult<Value> {
    match value {
        Value::Int(n) => Ok(n
            .checked_neg()
            .map_or(Value::Float(-(n as f64)), Value::Int)),
        Value::Float(n) => Ok(Value::Float(-n)),
        other => Err(EvalError::TypeMismatch {
            op: "-",
            left: other.type_name(),
            right: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::CaptureHost;

    fn program(source: &str) -> Program {
        let tokens = cypher_lexer::tokenize(source).expect("lexing failed");
        cypher_parser::parse(tokens).expect("parsing failed")
    }

    fn live_scopes(interpreter: &Interpreter<'_>) -> usize {
        interpreter
            .scopes
            .iter()
            .filter(|weak| weak.upgrade().is_some())
            .count()
    }

    #[test]
    fn test_call_scopes_with_nested_verse_are_released() {
        let mut source = String::from(
            "verse g(n) {\n    verse inner() {\n        return n\n    }\n    return inner()\n}\n",
        );
        for _ in 0..1000 {
            source.push_str("g(1)\n");
        }
        let program = program(&source);
        let mut host = CaptureHost::new();
        let mut interpreter = Interpreter::new(&mut host, EvalConfig::default());
        interpreter.run(&program).unwrap();
        assert_eq!(live_scopes(&interpreter), 0);
        assert!(interpreter.scopes.is_empty());
    }

    #[test]
    fn test_cycle_through_block_assignment_is_released() {
        let source = r#"
verse outer() {
    spit g = 0
    battle (true) {
        verse h() {
            return 1
        }
        g = h
    }
    return g()
}
flow outer(), outer(), outer()
"#;
        let program = program(source);
        let mut host = CaptureHost::new();
        let mut interpreter = Interpreter::new(&mut host, EvalConfig::default());
        interpreter.run(&program).unwrap();
        assert_eq!(live_scopes(&interpreter), 0);
        drop(interpreter);
        assert_eq!(host.output, vec!["1 1 1"]);
    }

    #[test]
    fn test_escaped_closures_keep_only_their_scopes() {
        let source = r#"
verse make(base) {
    verse add(n) {
        return base + n
    }
    return add
}
spit add5 = make(5)
spit add7 = make(7)
flow add5(1), add7(1), add5(add7(0))
"#;
        let program = program(source);
        let mut host = CaptureHost::new();
        let mut interpreter = Interpreter::new(&mut host, EvalConfig::default());
        interpreter.run(&program).unwrap();
        assert_eq!(live_scopes(&interpreter), 2);
        drop(interpreter);
        assert_eq!(host.output, vec!["6 8 12"]);
    }

    #[test]
    fn test_eval_depth_returns_to_zero() {
        let program = program("verse f(n) { return n + 1 }\nflow f(f(f(1)))");
        let mut host = CaptureHost::new();
        let mut interpreter = Interpreter::new(&mut host, EvalConfig::default());
        interpreter.run(&program).unwrap();
        assert_eq!(interpreter.eval_depth, 0);
        assert_eq!(interpreter.depth, 0);
    }

    #[test]
    fn test_int_overflow_promotes_to_float() {
        let result = binary_op(BinOp::Add, Value::Int(i64::MAX), Value::Int(1)).unwrap();
        assert!(matches!(result, Value::Float(_)));
        let result = binary_op(BinOp::Mul, Value::Int(i64::MAX), Value::Int(2)).unwrap();
        assert!(matches!(result, Value::Float(_)));
        assert!(matches!(negate(Value::Int(i64::MIN)), Ok(Value::Float(_))));
    }

    #[test]
    fn test_mixed_arithmetic_is_float() {
        let result = binary_op(BinOp::Sub, Value::Int(3), Value::Float(0.5)).unwrap();
        assert!(matches!(result, Value::Float(n) if n == 2.5));
    }

    #[test]
    fn test_division_always_float() {
        let result = binary_op(BinOp::Div, Value::Int(6), Value::Int(3)).unwrap();
        assert!(matches!(result, Value::Float(n) if n == 2.0));
        assert!(matches!(
            binary_op(BinOp::Div, Value::Int(1), Value::Float(0.0)),
            Err(EvalError::DivisionByZero)
        ));
    }

    #[test]
    fn test_text_concatenation_uses_display_forms() {
        let result = binary_op(BinOp::Add, Value::from("n="), Value::Float(2.0)).unwrap();
        assert_eq!(result, Value::from("n=2.0"));
        let result = binary_op(BinOp::Add, Value::Null, Value::from("!")).unwrap();
        assert_eq!(result, Value::from("null!"));
    }

    #[test]
    fn test_comparison_type_rules() {
        assert_eq!(
            binary_op(BinOp::Less, Value::from("abc"), Value::from("abd")).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            binary_op(BinOp::Greater, Value::Int(2), Value::Float(1.5)).unwrap(),
            Value::Bool(true)
        );
        assert!(matches!(
            binary_op(BinOp::Less, Value::Int(1), Value::from("2")),
            Err(EvalError::TypeMismatch {
                op: "<",
                left: "int",
                right: Some("text"),
            })
        ));
    }

    #[test]
    fn test_arithmetic_on_non_numbers_fails() {
        assert!(matches!(
            binary_op(BinOp::Mul, Value::Bool(true), Value::Int(2)),
            Err(EvalError::TypeMismatch { op: "*", .. })
        ));
        assert!(matches!(
            negate(Value::from("x")),
            Err(EvalError::TypeMismatch {
                op: "-",
                right: None,
                ..
            })
        ));
    }

    #[test]
    fn test_config_builder() {
        let config = EvalConfig::default()
            .with_max_call_depth(5)
            .with_max_eval_depth(64);
        assert_eq!(config.max_call_depth, 5);
        assert_eq!(config.max_eval_depth, 64);
        assert_eq!(EvalConfig::default().max_call_depth, DEFAULT_MAX_CALL_DEPTH);
        assert_eq!(EvalConfig::default().max_eval_depth, DEFAULT_MAX_EVAL_DEPTH);
    }
}
