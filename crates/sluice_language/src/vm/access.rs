//! Index and slice semantics.
//!
//! Positions are integral floats. Negative positions count back from the end.
//! Strings are indexed by character.

use sluice_foundation::{Error, ErrorKind, Heap, LtVec, Result, Type, Value};

/// Evaluates `base[key]`, or `base?[key]` when `optional` is set.
///
/// Optional access yields null for a null base, an out-of-range position,
/// or a missing key. A key of the wrong type is an error either way.
pub(crate) fn index_value(base: &Value, key: &Value, optional: bool) -> Result<Value> {
    let missing = |err: Error| if optional { Ok(Value::Null) } else { Err(err) };

    match base {
        Value::Null => missing(Error::new(ErrorKind::NullAccess)),
        Value::String(s) => {
            let position = position(key)?;
            let length = s.chars().count();
            match resolve(position, length).and_then(|i| s.chars().nth(i)) {
                Some(c) => Ok(Value::from(c.to_string())),
                None => missing(out_of_bounds(position, length)),
            }
        }
        Value::Boxed(b) => match b.heap() {
            Heap::Array(items) => {
                let position = position(key)?;
                match resolve(position, items.len()).and_then(|i| items.get(i)) {
                    Some(item) => Ok(item.clone()),
                    None => missing(out_of_bounds(position, items.len())),
                }
            }
            Heap::Object(entries) => {
                let name = key
                    .as_str()
                    .ok_or_else(|| Error::type_mismatch(Type::String, key.value_type()))?;
                match entries.get(name) {
                    Some(value) => Ok(value.clone()),
                    None => missing(Error::new(ErrorKind::MissingKey(name.to_string()))),
                }
            }
            Heap::Function(_) => Err(Error::type_mismatch(Type::Array, Type::Function)),
        },
        other => Err(Error::type_mismatch(
            if key.as_str().is_some() {
                Type::Object
            } else {
                Type::Array
            },
            other.value_type(),
        )),
    }
}

/// Evaluates `base[low:high:step]`.
///
/// Omitted bounds arrive as null and default to `0`, the length, and `1`.
/// Bounds are clamped to `[0, len]`; the step must be positive. A full
/// unit-step slice of an array returns the array itself.
pub(crate) fn slice_value(
    base: &Value,
    low: &Value,
    high: &Value,
    step: &Value,
    optional: bool,
) -> Result<Value> {
    let length = match base {
        Value::Null if optional => return Ok(Value::Null),
        Value::Null => return Err(Error::new(ErrorKind::NullAccess)),
        Value::String(s) => s.chars().count(),
        _ => match base.as_array() {
            Some(items) => items.len(),
            None => return Err(Error::type_mismatch(Type::Array, base.value_type())),
        },
    };

    let step = match bound(step)? {
        None => 1,
        Some(n) if n > 0 => n,
        Some(n) => return Err(Error::new(ErrorKind::InvalidSliceStep(n))),
    };
    let start = bound(low)?.map_or(0, |n| clamp(n, length));
    let end = bound(high)?.map_or(length, |n| clamp(n, length));
    let stride = usize::try_from(step).unwrap_or(usize::MAX);

    if let Value::String(s) = base {
        let text: String = s
            .chars()
            .enumerate()
            .skip(start)
            .take(end.saturating_sub(start))
            .step_by(stride)
            .map(|(_, c)| c)
            .collect();
        return Ok(Value::from(text));
    }

    let Some(items) = base.as_array() else {
        return Err(Error::type_mismatch(Type::Array, base.value_type()));
    };
    if stride == 1 {
        if start == 0 && end == length {
            return Ok(base.clone());
        }
        return Ok(Value::from(items.range(start, end)));
    }
    let picked: LtVec<Value> = items
        .iter()
        .skip(start)
        .take(end.saturating_sub(start))
        .step_by(stride)
        .cloned()
        .collect();
    Ok(Value::from(picked))
}

fn position(key: &Value) -> Result<i64> {
    key.as_integer()
        .ok_or_else(|| Error::type_mismatch(Type::Integer, key.value_type()))
}

fn bound(value: &Value) -> Result<Option<i64>> {
    if value.is_null() {
        Ok(None)
    } else {
        position(value).map(Some)
    }
}

fn signed_len(length: usize) -> i64 {
    i64::try_from(length).unwrap_or(i64::MAX)
}

/// Maps a possibly negative position to an in-range index.
fn resolve(position: i64, length: usize) -> Option<usize> {
    let index = if position < 0 {
        position.checked_add(signed_len(length))?
    } else {
        position
    };
    usize::try_from(index).ok().filter(|&i| i < length)
}

/// Maps a possibly negative slice bound into `[0, length]`.
fn clamp(bound: i64, length: usize) -> usize {
    let len = signed_len(length);
    let adjusted = if bound < 0 {
        bound.saturating_add(len)
    } else {
        bound
    };
    usize::try_from(adjusted.clamp(0, len)).unwrap_or(length)
}

fn out_of_bounds(index: i64, length: usize) -> Error {
    Error::new(ErrorKind::IndexOutOfBounds { index, length })
}
