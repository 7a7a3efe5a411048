//! Collection functions.

use sluice_foundation::{Boxed, Error, Heap, Result, Type, Value};

use crate::{pair, single};

/// `len(x)`: elements of an array, entries of an object, or characters of a
/// string. `len(null)` is 0.
pub(crate) fn native_len(args: &[Value]) -> Result<Value> {
    let value = single(args)?;
    let length = match value {
        Value::Null => 0,
        Value::String(s) => s.chars().count(),
        _ => match value.as_boxed().map(Boxed::heap) {
            Some(Heap::Array(items)) => items.len(),
            Some(Heap::Object(entries)) => entries.len(),
            _ => return Err(Error::type_mismatch(Type::Array, value.value_type())),
        },
    };
    Ok(Value::from(length))
}

/// `keys(obj)`: the object's keys in sorted order.
pub(crate) fn native_keys(args: &[Value]) -> Result<Value> {
    let value = single(args)?;
    match value {
        Value::Null => Ok(Value::array([])),
        _ => {
            let entries = value
                .as_object()
                .ok_or_else(|| Error::type_mismatch(Type::Object, value.value_type()))?;
            Ok(Value::array(entries.keys().map(|k| Value::from(k.clone()))))
        }
    }
}

/// `values(obj)`: the object's values in key order.
pub(crate) fn native_values(args: &[Value]) -> Result<Value> {
    let value = single(args)?;
    match value {
        Value::Null => Ok(Value::array([])),
        _ => {
            let entries = value
                .as_object()
                .ok_or_else(|| Error::type_mismatch(Type::Object, value.value_type()))?;
            Ok(Value::array(entries.values().cloned()))
        }
    }
}

/// `contains(haystack, needle)`: array membership, substring search, or
/// object key presence.
pub(crate) fn native_contains(args: &[Value]) -> Result<Value> {
    let (haystack, needle) = pair(args)?;
    let found = match haystack {
        Value::String(s) => {
            let part = needle
                .as_str()
                .ok_or_else(|| Error::type_mismatch(Type::String, needle.value_type()))?;
            s.contains(part)
        }
        _ => match haystack.as_boxed().map(Boxed::heap) {
            Some(Heap::Array(items)) => items.iter().any(|item| item == needle),
            Some(Heap::Object(entries)) => {
                let key = needle
                    .as_str()
                    .ok_or_else(|| Error::type_mismatch(Type::String, needle.value_type()))?;
                entries.contains_key(key)
            }
            _ => return Err(Error::type_mismatch(Type::Array, haystack.value_type())),
        },
    };
    Ok(Value::Bool(found))
}
