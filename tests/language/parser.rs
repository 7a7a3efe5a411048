//! Integration tests for the parser

use sluice_foundation::ErrorKind;
use sluice_language::{BinaryOp, Expr, parse};

fn binary_op(expr: &Expr) -> BinaryOp {
    match expr {
        Expr::Binary { op, .. } => *op,
        other => panic!("expected binary expression, got {other:?}"),
    }
}

#[test]
fn precedence_levels() {
    assert_eq!(binary_op(&parse("a || b && c").expect("parse")), BinaryOp::Or);
    assert_eq!(binary_op(&parse("a & b == c").expect("parse")), BinaryOp::BitAnd);
    assert_eq!(binary_op(&parse("a + b << c").expect("parse")), BinaryOp::Shl);
    assert_eq!(binary_op(&parse("a < b + c").expect("parse")), BinaryOp::Lt);
}

#[test]
fn pipe_binds_loosest() {
    let expr = parse("xs + ys |map: $item || 0 |filter: $item").expect("parse");
    let Expr::Pipe { base, stages, .. } = expr else {
        panic!("expected pipe");
    };
    assert_eq!(binary_op(&base), BinaryOp::Add);
    let names: Vec<&str> = stages.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["map", "filter"]);
    assert_eq!(binary_op(&stages[0].body), BinaryOp::Or);
}

#[test]
fn spans_cover_source() {
    let source = "total + tax";
    let expr = parse(source).expect("parse");
    assert_eq!(expr.span().text(source), Some(source));
}

#[test]
fn errors_report_position() {
    let err = parse("1 +\n  * 2").expect_err("dangling operator");
    let ErrorKind::ParseError { line, .. } = err.kind else {
        panic!("expected parse error, got {:?}", err.kind);
    };
    assert_eq!(line, 2);
    assert!(err.is_compile_error());
}

#[test]
fn rejects_malformed_input() {
    for source in ["", "(1", "[1, 2", "{a 1}", "a = 1", r#""open"#, "f(,)"] {
        assert!(parse(source).is_err(), "{source:?} should not parse");
    }
}
