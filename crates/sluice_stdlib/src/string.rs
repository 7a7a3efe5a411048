//! String functions and conversions.

use sluice_foundation::{Error, Result, Type, Value};

use crate::{single, text};

pub(crate) fn native_upper(args: &[Value]) -> Result<Value> {
    Ok(Value::from(text(single(args)?)?.to_uppercase()))
}

pub(crate) fn native_lower(args: &[Value]) -> Result<Value> {
    Ok(Value::from(text(single(args)?)?.to_lowercase()))
}

/// `string(x)`: strings unchanged, everything else in display form.
pub(crate) fn native_string(args: &[Value]) -> Result<Value> {
    let value = single(args)?;
    match value {
        Value::String(_) => Ok(value.clone()),
        other => Ok(Value::from(other.to_string())),
    }
}

/// `number(x)`: parses strings, maps booleans to 1 and 0.
///
/// A string that is not a number yields null. Null stays null.
pub(crate) fn native_number(args: &[Value]) -> Result<Value> {
    let value = single(args)?;
    match value {
        Value::Null => Ok(Value::Null),
        Value::Float(_) => Ok(value.clone()),
        Value::Bool(b) => Ok(Value::Float(if *b { 1.0 } else { 0.0 })),
        Value::String(s) => Ok(s
            .trim()
            .parse::<f64>()
            .map_or(Value::Null, Value::Float)),
        Value::Boxed(_) => Err(Error::type_mismatch(Type::Float, value.value_type())),
    }
}
