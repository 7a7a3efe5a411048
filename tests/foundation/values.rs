//! Integration tests for Value types
//!
//! Tests construction, truthiness, equality, display, and accessors.

use std::sync::Arc;

use sluice_foundation::{LtMap, LtVec, NativeFn, Result, Type, Value, format_number};

// =============================================================================
// Construction
// =============================================================================

#[test]
fn integers_normalise_to_float() {
    assert_eq!(Value::from(3i32), Value::Float(3.0));
    assert_eq!(Value::from(3i64), Value::Float(3.0));
    assert_eq!(Value::from(3u32), Value::Float(3.0));
    assert_eq!(Value::from(3usize), Value::Float(3.0));
    assert_eq!(Value::from(3i32).value_type(), Type::Float);
}

#[test]
fn option_maps_none_to_null() {
    assert_eq!(Value::from(None::<i32>), Value::Null);
    assert_eq!(Value::from(Some("x")), Value::from("x"));
}

#[test]
fn array_and_object_construction() {
    let arr = Value::from(vec![1, 2, 3]);
    assert_eq!(arr.value_type(), Type::Array);
    assert_eq!(arr.as_array().map(LtVec::len), Some(3));

    let obj = Value::object([("x", Value::from(1)), ("y", Value::from(2))]);
    assert_eq!(obj.value_type(), Type::Object);
    assert_eq!(
        obj.as_object().and_then(|o| o.get("y")),
        Some(&Value::Float(2.0))
    );
}

#[test]
fn shared_structure_from_collections() {
    let items: LtVec<Value> = (1..=3).map(Value::from).collect();
    let base = Value::from(items.clone());
    let tail = Value::from(items.range(1, 3));
    assert_eq!(base.as_array().map(LtVec::len), Some(3));
    assert_eq!(tail, Value::from(vec![2, 3]));
}

// =============================================================================
// Truthiness
// =============================================================================

#[test]
fn falsy_values() {
    for value in [
        Value::Null,
        Value::Bool(false),
        Value::Float(0.0),
        Value::from(""),
        Value::array([]),
        Value::from(LtMap::<Value>::new()),
    ] {
        assert!(!value.is_truthy(), "{value:?} should be falsy");
    }
}

fn noop(_: &[Value]) -> Result<Value> {
    Ok(Value::Null)
}

#[test]
fn truthy_values() {
    for value in [
        Value::Bool(true),
        Value::Float(-1.0),
        Value::Float(f64::NAN),
        Value::from(" "),
        Value::from(vec![0]),
        Value::object([("a", Value::Null)]),
        Value::function(NativeFn::new("noop", noop)),
    ] {
        assert!(value.is_truthy(), "{value:?} should be truthy");
    }
}

// =============================================================================
// Equality
// =============================================================================

#[test]
fn equality_is_within_variant() {
    assert_ne!(Value::Float(0.0), Value::Bool(false));
    assert_ne!(Value::Null, Value::Bool(false));
    assert_ne!(Value::from("1"), Value::Float(1.0));
    assert_ne!(Value::Float(f64::NAN), Value::Float(f64::NAN));
}

#[test]
fn boxed_equality_is_structural() {
    let a = Value::from(vec![1, 2]);
    let b = Value::from(vec![1, 2]);
    assert_eq!(a, b);
    let (Some(x), Some(y)) = (a.as_boxed(), b.as_boxed()) else {
        panic!("expected boxed values");
    };
    assert!(!x.ptr_eq(y));
    let copy = a.clone();
    assert!(x.ptr_eq(copy.as_boxed().expect("boxed")));
}

#[test]
fn function_equality_uses_name_and_pointer() {
    let f = Value::function(NativeFn::new("noop", noop));
    let g = Value::function(NativeFn::new("other", noop));
    assert_eq!(f, Value::function(NativeFn::new("noop", noop)));
    assert_ne!(f, g);
}

// =============================================================================
// Display
// =============================================================================

#[test]
fn number_formatting() {
    assert_eq!(format_number(3.0), "3");
    assert_eq!(format_number(-0.5), "-0.5");
    assert_eq!(format_number(1e20), "100000000000000000000");
    assert_eq!(Value::Float(42.0).to_string(), "42");
}

#[test]
fn nested_display() {
    let value = Value::object([
        ("name", Value::from("ada")),
        ("tags", Value::from(vec![Value::from("x"), Value::Null])),
    ]);
    assert_eq!(value.to_string(), r#"{name: "ada", tags: ["x", null]}"#);
    assert_eq!(Value::from("bare").to_string(), "bare");
    assert_eq!(
        Value::function(NativeFn::new("noop", noop)).to_string(),
        "<fn noop>"
    );
}

// =============================================================================
// Accessors
// =============================================================================

#[test]
fn integer_accessor() {
    assert_eq!(Value::Float(7.0).as_integer(), Some(7));
    assert_eq!(Value::Float(-2.0).as_integer(), Some(-2));
    assert_eq!(Value::Float(1.5).as_integer(), None);
    assert_eq!(Value::Float(f64::INFINITY).as_integer(), None);
    assert_eq!(Value::from("7").as_integer(), None);
}

#[test]
fn string_accessor_shares_storage() {
    let s: Arc<str> = "shared".into();
    let value = Value::from(Arc::clone(&s));
    assert_eq!(value.as_str(), Some("shared"));
    assert_eq!(Arc::strong_count(&s), 2);
}
