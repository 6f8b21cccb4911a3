//! End-to-end pipeline tests.
//!
//! Tests verify the full pipeline: source → lex → parse → evaluate, the
//! unified error type, structured diagnostics, and that the canonical
//! printer's output runs the same as the original source.

use cypher::{
    parse_source, run, run_with, CaptureHost, Error, ErrorCategory, ErrorCode, EvalConfig,
    EvalError, SourceFile, Value,
};

// ══════════════════════════════════════════════════════════════════════════════
// Sample programs
// ══════════════════════════════════════════════════════════════════════════════

const FACTORIAL: &str = r#"
// Recursive factorial with an early return inside a nested battle.
verse fact(n) {
    battle (n < 2) {
        return 1
    }
    defeat {
        return n * fact(n - 1)
    }
}

cypher {
    flow "5! =", fact(5)
    return fact(6)
}
"#;

const GREETER: &str = r#"
spit greeting = 'Yo'

verse greet(name) {
    battle (name == null) {
        return greeting + ", stranger"
    }
    return greeting + ", " + name
}

cypher {
    flow greet(listen())
    flow greet(listen())
}
"#;

const COUNTER: &str = r#"
spit count = 0

verse bump(by) {
    count = count + by
    return count
}

bump(2)
bump(3)

cypher {
    battle (count > 4) {
        flow "count is", count
    } defeat {
        flow "too low"
    }
    spit count = 100
    flow "shadowed", count
    flow "ratio", bump(1) / 4
}
"#;

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

fn output_of(source: &str) -> Vec<String> {
    let outcome = run(source);
    if let Err(e) = &outcome.result {
        panic!("unexpected error: {e}");
    }
    outcome.output
}

fn lines(expected: &[&str]) -> Vec<String> {
    expected.iter().map(|s| s.to_string()).collect()
}

// ══════════════════════════════════════════════════════════════════════════════
// Successful runs
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_factorial_program() {
    let outcome = run(FACTORIAL);
    assert_eq!(outcome.output, lines(&["5! = 120"]));
    assert_eq!(outcome.result.unwrap(), Some(Value::Int(720)));
}

#[test]
fn test_greeter_with_input() {
    let mut host = CaptureHost::with_input(["Ada"]);
    let result = run_with(GREETER, &mut host, EvalConfig::default()).unwrap();
    assert_eq!(result, None);
    assert_eq!(host.output, lines(&["Yo, Ada", "Yo, stranger"]));
}

#[test]
fn test_counter_program() {
    assert_eq!(
        output_of(COUNTER),
        lines(&["count is 5", "shadowed 100", "ratio 1.5"])
    );
}

#[test]
fn test_spec_examples() {
    assert_eq!(
        output_of("battle (0) { flow \"a\" } defeat { flow \"b\" }"),
        lines(&["b"])
    );
    assert_eq!(output_of("flow 1 + 2"), lines(&["3"]));
    assert_eq!(output_of("flow \"a\" + \"b\""), lines(&["ab"]));
}

#[test]
fn test_run_without_entry_point() {
    let outcome = run("flow \"only top level\"");
    assert_eq!(outcome.output, lines(&["only top level"]));
    assert_eq!(outcome.result.unwrap(), None);
}

// ══════════════════════════════════════════════════════════════════════════════
// Errors from each stage
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_lex_error_stops_before_running() {
    let outcome = run("flow \"never printed\"\nflow @");
    assert!(outcome.output.is_empty());
    let err = outcome.result.unwrap_err();
    assert!(matches!(err, Error::Lex(_)));
    assert_eq!(err.code(), ErrorCode::UNEXPECTED_CHARACTER);
    assert_eq!(err.line(), Some(2));
}

#[test]
fn test_parse_error_stops_before_running() {
    let outcome = run("flow \"never printed\"\nspit = 3");
    assert!(outcome.output.is_empty());
    let err = outcome.result.unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
    assert_eq!(err.code(), ErrorCode::UNEXPECTED_TOKEN);
    assert_eq!(err.code().category(), ErrorCategory::Syntax);
}

#[test]
fn test_division_by_zero_keeps_earlier_output() {
    let outcome = run("flow \"before\"\nflow 1 / 0\nflow \"after\"");
    assert_eq!(outcome.output, lines(&["before"]));
    assert!(matches!(
        outcome.result,
        Err(Error::Eval(EvalError::DivisionByZero))
    ));
}

#[test]
fn test_arity_mismatch_skips_body() {
    let outcome = run("verse f(a) { flow \"body\" }\nf(1, 2)");
    assert!(outcome.output.is_empty());
    let err = outcome.result.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ARITY_MISMATCH);
    assert_eq!(err.to_string(), "'f' expects 1 argument(s), got 2");
}

#[test]
fn test_recursion_limit_is_configurable() {
    let mut host = CaptureHost::new();
    let config = EvalConfig::default().with_max_call_depth(10);
    let err = run_with("verse loop_(n) { return loop_(n) }\nloop_(1)", &mut host, config)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::RECURSION_LIMIT);
    assert_eq!(err.to_string(), "maximum call depth of 10 exceeded");
}

#[test]
fn test_long_operator_chain_fails_to_parse() {
    let outcome = run(&format!("flow {}", vec!["1"; 20_000].join(" + ")));
    assert!(outcome.output.is_empty());
    let err = outcome.result.unwrap_err();
    assert_eq!(err.code(), ErrorCode::NESTING_TOO_DEEP);
    assert_eq!(err.line(), Some(1));
}

#[test]
fn test_operator_chain_within_limit_runs() {
    let source = format!("flow {}", vec!["1"; 100].join(" + "));
    assert_eq!(output_of(&source), lines(&["100"]));
}

#[test]
fn test_deep_evaluation_is_reported_not_fatal() {
    let body = format!("{}f(n - 1){}", "(0 + ".repeat(50), ")".repeat(50));
    let source = format!("verse f(n) {{\n    battle (n < 1) {{ return 0 }}\n    return {body}\n}}\nflow f(190)");
    let err = run(&source).result.unwrap_err();
    assert_eq!(err.code(), ErrorCode::STACK_OVERFLOW);
    assert_eq!(err.code().category(), ErrorCategory::Runtime);
}

#[test]
fn test_number_beyond_float_range_fails_to_parse() {
    let err = run(&format!("flow 1{}", "0".repeat(310))).result.unwrap_err();
    assert_eq!(err.code(), ErrorCode::INVALID_NUMBER);
}

#[test]
fn test_each_stage_error_has_its_category() {
    let cases = [
        ("flow $", ErrorCategory::Lexical),
        ("flow (", ErrorCategory::Syntax),
        ("flow 1.2.3", ErrorCategory::Syntax),
        ("flow nope", ErrorCategory::Runtime),
        ("nope = 1", ErrorCategory::Runtime),
        ("flow -true", ErrorCategory::Runtime),
    ];
    for (source, category) in cases {
        let err = run(source).result.unwrap_err();
        assert_eq!(err.code().category(), category, "source: {source}");
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Diagnostics
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_syntax_diagnostic_json() {
    let source = SourceFile::new("main.cyp", "spit x = 1\nbattle x { }");
    let err = run(&source.source).result.unwrap_err();
    let diag = err.to_diagnostic(&source);
    let json = serde_json::to_value(&diag).unwrap();
    assert_eq!(json["file"], "main.cyp");
    assert_eq!(json["code"], 200);
    assert_eq!(json["category"], "syntax");
    assert_eq!(json["line"], 2);
    assert_eq!(json["source_line"], "battle x { }");
    assert_eq!(json["message"], "expected '(', found identifier on line 2");
}

#[test]
fn test_runtime_diagnostic_json_omits_position() {
    let source = SourceFile::new("main.cyp", "flow ghost");
    let err = run(&source.source).result.unwrap_err();
    let json = serde_json::to_value(err.to_diagnostic(&source)).unwrap();
    assert_eq!(json["code"], 300);
    assert_eq!(json["category"], "runtime");
    assert_eq!(json["message"], "undefined variable 'ghost'");
    assert!(json.get("line").is_none());
    assert!(json.get("source_line").is_none());
}

#[test]
fn test_undefined_assignment_code() {
    let err = run("ghost = 1").result.unwrap_err();
    assert_eq!(err.code(), ErrorCode::UNDEFINED_ASSIGNMENT);
}

// ══════════════════════════════════════════════════════════════════════════════
// Canonical printing
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_printed_programs_reparse_identically() {
    for source in [FACTORIAL, GREETER, COUNTER] {
        let program = parse_source(source).unwrap();
        let printed = program.to_string();
        let reparsed = parse_source(&printed)
            .unwrap_or_else(|e| panic!("printed form failed to parse: {e}\n{printed}"));
        assert_eq!(program, reparsed);
    }
}

#[test]
fn test_printed_program_runs_the_same() {
    let printed = parse_source(COUNTER).unwrap().to_string();
    assert_eq!(output_of(&printed), output_of(COUNTER));
}

// ══════════════════════════════════════════════════════════════════════════════
// Isolation
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_runs_do_not_share_state() {
    assert!(run("spit shared = 1").result.is_ok());
    let err = run("flow shared").result.unwrap_err();
    assert!(matches!(err, Error::Eval(EvalError::UndefinedVariable { .. })));
}

#[test]
fn test_run_is_deterministic() {
    let first = run(COUNTER).output;
    for _ in 0..5 {
        assert_eq!(run(COUNTER).output, first);
    }
}
