//! Integration tests for serde interop
//!
//! Values round-trip through MessagePack; integers come back as floats.

use serde::{Deserialize, Serialize};
use sluice_foundation::{NativeFn, Result, Value};

#[derive(Serialize, Deserialize)]
struct Envelope {
    count: i64,
    ratio: f64,
    label: String,
    tags: Vec<String>,
    missing: Option<i32>,
}

#[test]
fn scalars_round_trip() {
    for value in [
        Value::Null,
        Value::Bool(true),
        Value::Float(2.5),
        Value::from("text"),
    ] {
        let bytes = rmp_serde::to_vec(&value).expect("serialize");
        let back: Value = rmp_serde::from_slice(&bytes).expect("deserialize");
        assert_eq!(back, value);
    }
}

#[test]
fn nested_round_trip() {
    let value = Value::object([
        ("items", Value::from(vec![1, 2, 3])),
        ("meta", Value::object([("ok", Value::Bool(true))])),
    ]);
    let bytes = rmp_serde::to_vec(&value).expect("serialize");
    let back: Value = rmp_serde::from_slice(&bytes).expect("deserialize");
    assert_eq!(back, value);
}

#[test]
fn foreign_struct_becomes_object() {
    let envelope = Envelope {
        count: 3,
        ratio: 0.5,
        label: "box".into(),
        tags: vec!["a".into(), "b".into()],
        missing: None,
    };
    let bytes = rmp_serde::to_vec_named(&envelope).expect("serialize");
    let value: Value = rmp_serde::from_slice(&bytes).expect("deserialize");

    let obj = value.as_object().expect("object");
    assert_eq!(obj.get("count"), Some(&Value::Float(3.0)));
    assert_eq!(obj.get("ratio"), Some(&Value::Float(0.5)));
    assert_eq!(obj.get("label"), Some(&Value::from("box")));
    assert_eq!(
        obj.get("tags"),
        Some(&Value::from(vec![Value::from("a"), Value::from("b")]))
    );
    assert_eq!(obj.get("missing"), Some(&Value::Null));
}

fn noop(_: &[Value]) -> Result<Value> {
    Ok(Value::Null)
}

#[test]
fn functions_do_not_serialize() {
    let value = Value::from(vec![Value::function(NativeFn::new("noop", noop))]);
    assert!(rmp_serde::to_vec(&value).is_err());
}
