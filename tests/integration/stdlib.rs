//! Standard library functions driven through the VM.

use sluice::foundation::{ErrorKind, Value};
use sluice::language::Context;
use sluice::standard_vm;

fn eval(source: &str) -> Value {
    standard_vm()
        .eval(source, &Context::new())
        .expect("eval failed")
}

#[test]
fn aggregates() {
    assert_eq!(eval("sum([1, 2, 3])"), Value::Float(6.0));
    assert_eq!(eval("sum(1, 2, 3)"), Value::Float(6.0));
    assert_eq!(eval("average([2, 4])"), Value::Float(3.0));
    assert_eq!(eval("min([3, -1, 2])"), Value::Float(-1.0));
    assert_eq!(eval("max(3, -1, 2)"), Value::Float(3.0));
    assert_eq!(eval("average([])"), Value::Null);
}

#[test]
fn rounding() {
    assert_eq!(eval("abs(-3)"), Value::Float(3.0));
    assert_eq!(eval("floor(2.7)"), Value::Float(2.0));
    assert_eq!(eval("ceil(2.1)"), Value::Float(3.0));
    assert_eq!(eval("round(2.5)"), Value::Float(3.0));
}

#[test]
fn strings_and_conversions() {
    assert_eq!(eval(r#"upper("abc")"#), Value::from("ABC"));
    assert_eq!(eval(r#"lower("ABC")"#), Value::from("abc"));
    assert_eq!(eval("string(12) + string(true)"), Value::from("12true"));
    assert_eq!(eval(r#"number("3.5") * 2"#), Value::Float(7.0));
    assert_eq!(eval(r#"number("x") || -1"#), Value::Float(-1.0));
}

#[test]
fn collections() {
    assert_eq!(eval(r#"len("héllo")"#), Value::Float(5.0));
    assert_eq!(eval("len({a: 1, b: 2})"), Value::Float(2.0));
    assert_eq!(
        eval("keys({b: 1, a: 2})"),
        Value::from(vec!["a", "b"])
    );
    assert_eq!(eval("values({b: 1, a: 2})"), Value::from(vec![2, 1]));
    assert_eq!(eval("contains([1, 2, 3], 2)"), Value::Bool(true));
    assert_eq!(eval(r#"contains("pipeline", "line")"#), Value::Bool(true));
}

#[test]
fn stdlib_inside_stages() {
    assert_eq!(
        eval(r#"["a", "bb", "ccc"] |filter: len($item) > 1 |map: upper($item)"#),
        Value::from(vec!["BB", "CCC"])
    );
}

#[test]
fn type_errors() {
    let err = standard_vm()
        .eval(r#"sum([1, "2"])"#, &Context::new())
        .expect_err("string in sum");
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
}
