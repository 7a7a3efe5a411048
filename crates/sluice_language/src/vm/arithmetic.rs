//! Arithmetic, comparison, and bitwise helpers for the VM.

use std::cmp::Ordering;

use sluice_foundation::{Error, ErrorKind, Result, Type, Value, format_number};

/// Adds two values.
///
/// Floats add; strings concatenate. A string with a float on either side
/// formats the number and concatenates.
pub(crate) fn add_values(a: Value, b: Value) -> Result<Value> {
    match (&a, &b) {
        (Value::Float(x), Value::Float(y)) => Ok(Value::Float(x + y)),
        (Value::String(x), Value::String(y)) => Ok(Value::from(format!("{x}{y}"))),
        (Value::String(x), Value::Float(y)) => Ok(Value::from(format!("{x}{}", format_number(*y)))),
        (Value::Float(x), Value::String(y)) => Ok(Value::from(format!("{}{y}", format_number(*x)))),
        _ => Err(unsupported("+", &a, &b)),
    }
}

/// Subtracts two values.
pub(crate) fn sub_values(a: Value, b: Value) -> Result<Value> {
    let (x, y) = floats("-", &a, &b)?;
    Ok(Value::Float(x - y))
}

/// Multiplies two values.
pub(crate) fn mul_values(a: Value, b: Value) -> Result<Value> {
    let (x, y) = floats("*", &a, &b)?;
    Ok(Value::Float(x * y))
}

/// Divides two values.
pub(crate) fn div_values(a: Value, b: Value) -> Result<Value> {
    let (x, y) = floats("/", &a, &b)?;
    if y == 0.0 {
        return Err(Error::new(ErrorKind::DivisionByZero));
    }
    Ok(Value::Float(x / y))
}

/// Truncated remainder; the result takes the sign of the dividend.
pub(crate) fn mod_values(a: Value, b: Value) -> Result<Value> {
    let (x, y) = floats("%", &a, &b)?;
    if y == 0.0 {
        return Err(Error::new(ErrorKind::DivisionByZero));
    }
    Ok(Value::Float(x % y))
}

/// Raises `a` to the power `b`.
pub(crate) fn pow_values(a: Value, b: Value) -> Result<Value> {
    let (x, y) = floats("**", &a, &b)?;
    Ok(Value::Float(x.powf(y)))
}

/// Negates a value.
pub(crate) fn neg_value(a: Value) -> Result<Value> {
    match a {
        Value::Float(x) => Ok(Value::Float(-x)),
        other => Err(Error::type_mismatch(Type::Float, other.value_type())),
    }
}

/// Orders two floats or two strings and applies `test` to the result.
///
/// Comparisons involving NaN are false.
pub(crate) fn compare_values(a: &Value, b: &Value, test: fn(Ordering) -> bool) -> Result<Value> {
    let ordering = match (a, b) {
        (Value::Float(x), Value::Float(y)) => x.partial_cmp(y),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::String(_), other) => {
            return Err(Error::type_mismatch(Type::String, other.value_type()));
        }
        (Value::Float(_), other) => {
            return Err(Error::type_mismatch(Type::Float, other.value_type()));
        }
        (other, _) => return Err(Error::type_mismatch(Type::Float, other.value_type())),
    };
    Ok(Value::Bool(ordering.is_some_and(test)))
}

/// Applies an `i64` operation to two integral operands.
pub(crate) fn bitwise_values(a: &Value, b: &Value, op: fn(i64, i64) -> i64) -> Result<Value> {
    Ok(from_i64(op(integer(a)?, integer(b)?)))
}

/// Shifts `a` by `b` bits; `b` must be in `0..=63`.
pub(crate) fn shift_values(a: &Value, b: &Value, left: bool) -> Result<Value> {
    let x = integer(a)?;
    let n = integer(b)?;
    let amount = u32::try_from(n)
        .ok()
        .filter(|&n| n <= 63)
        .ok_or_else(|| Error::new(ErrorKind::ShiftOutOfRange(n)))?;
    Ok(from_i64(if left { x << amount } else { x >> amount }))
}

/// Bitwise complement.
pub(crate) fn bit_not_value(a: &Value) -> Result<Value> {
    Ok(from_i64(!integer(a)?))
}

fn integer(value: &Value) -> Result<i64> {
    value
        .as_integer()
        .ok_or_else(|| Error::type_mismatch(Type::Integer, value.value_type()))
}

#[allow(clippy::cast_precision_loss)]
fn from_i64(n: i64) -> Value {
    Value::Float(n as f64)
}

fn floats(op: &'static str, a: &Value, b: &Value) -> Result<(f64, f64)> {
    match (a, b) {
        (Value::Float(x), Value::Float(y)) => Ok((*x, *y)),
        _ => Err(unsupported(op, a, b)),
    }
}

fn unsupported(op: &'static str, a: &Value, b: &Value) -> Error {
    Error::unsupported_operands(op, a.value_type(), b.value_type())
}
