//! Math functions.
//!
//! The aggregate functions accept either a single array or the numbers as
//! separate arguments: `sum([1, 2])` and `sum(1, 2)` agree.

use sluice_foundation::{Result, Value};

use crate::{float, single};

/// Collects the numeric operands of an aggregate call.
fn numbers(args: &[Value]) -> Result<Vec<f64>> {
    let array = match args {
        [value] => value.as_array(),
        _ => None,
    };
    match array {
        Some(items) => items.iter().map(float).collect(),
        None => args.iter().map(float).collect(),
    }
}

/// `sum(xs)`: 0 for no numbers.
pub(crate) fn native_sum(args: &[Value]) -> Result<Value> {
    Ok(Value::Float(numbers(args)?.into_iter().fold(0.0, |a, b| a + b)))
}

/// `average(xs)`: null for no numbers.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn native_average(args: &[Value]) -> Result<Value> {
    let values = numbers(args)?;
    if values.is_empty() {
        return Ok(Value::Null);
    }
    let total: f64 = values.iter().fold(0.0, |a, b| a + b);
    Ok(Value::Float(total / values.len() as f64))
}

/// `min(xs)`: null for no numbers.
pub(crate) fn native_min(args: &[Value]) -> Result<Value> {
    Ok(numbers(args)?
        .into_iter()
        .reduce(f64::min)
        .map_or(Value::Null, Value::Float))
}

/// `max(xs)`: null for no numbers.
pub(crate) fn native_max(args: &[Value]) -> Result<Value> {
    Ok(numbers(args)?
        .into_iter()
        .reduce(f64::max)
        .map_or(Value::Null, Value::Float))
}

pub(crate) fn native_abs(args: &[Value]) -> Result<Value> {
    unary(args, f64::abs)
}

pub(crate) fn native_floor(args: &[Value]) -> Result<Value> {
    unary(args, f64::floor)
}

pub(crate) fn native_ceil(args: &[Value]) -> Result<Value> {
    unary(args, f64::ceil)
}

/// Rounds half away from zero.
pub(crate) fn native_round(args: &[Value]) -> Result<Value> {
    unary(args, f64::round)
}

fn unary(args: &[Value], op: fn(f64) -> f64) -> Result<Value> {
    Ok(Value::Float(op(float(single(args)?)?)))
}
