//! Standard library functions for Sluice expressions.
//!
//! This crate provides built-in functions organized by category:
//! - Collection functions (`len`, `keys`, `values`, `contains`)
//! - Math functions (`sum`, `average`, `min`, `max`, `abs`, `floor`, `ceil`, `round`)
//! - String functions (`upper`, `lower`, `string`, `number`)
//!
//! Install them with [`registry`], or add them to a builder that also carries
//! application functions with [`register`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod collection;
mod math;
mod string;


use sluice_foundation::{Error, NativeFn, Result, Type, Value};
use sluice_language::{FunctionRegistry, FunctionRegistryBuilder};

/// Every standard function.
pub const FUNCTIONS: &[NativeFn] = &[
    NativeFn::new("len", collection::native_len),
    NativeFn::new("keys", collection::native_keys),
    NativeFn::new("values", collection::native_values),
    NativeFn::new("contains", collection::native_contains),
    NativeFn::new("sum", math::native_sum),
    NativeFn::new("average", math::native_average),
    NativeFn::new("min", math::native_min),
    NativeFn::new("max", math::native_max),
    NativeFn::new("abs", math::native_abs),
    NativeFn::new("floor", math::native_floor),
    NativeFn::new("ceil", math::native_ceil),
    NativeFn::new("round", math::native_round),
    NativeFn::new("upper", string::native_upper),
    NativeFn::new("lower", string::native_lower),
    NativeFn::new("string", string::native_string),
    NativeFn::new("number", string::native_number),
];

/// Returns a registry holding the standard functions.
#[must_use]
pub fn registry() -> FunctionRegistry {
    register(FunctionRegistry::builder()).build()
}

/// Adds the standard functions to `builder`.
///
/// Functions registered on the builder afterwards replace standard ones of the
/// same name.
#[must_use]
pub fn register(builder: FunctionRegistryBuilder) -> FunctionRegistryBuilder {
    builder.register_all(FUNCTIONS.iter().copied())
}

// =============================================================================
// Argument helpers
// =============================================================================

/// Requires exactly one argument.
fn single(args: &[Value]) -> Result<&Value> {
    match args {
        [value] => Ok(value),
        _ => Err(Error::arity_mismatch("1", args.len())),
    }
}

/// Requires exactly two arguments.
fn pair(args: &[Value]) -> Result<(&Value, &Value)> {
    match args {
        [a, b] => Ok((a, b)),
        _ => Err(Error::arity_mismatch("2", args.len())),
    }
}

fn float(value: &Value) -> Result<f64> {
    value
        .as_float()
        .ok_or_else(|| Error::type_mismatch(Type::Float, value.value_type()))
}

fn text(value: &Value) -> Result<&str> {
    value
        .as_str()
        .ok_or_else(|| Error::type_mismatch(Type::String, value.value_type()))
}
