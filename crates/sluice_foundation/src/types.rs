//! Type descriptors used in runtime error reporting.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Type descriptor for a runtime [`Value`](crate::Value).
///
/// Sluice is dynamically typed; these descriptors exist so that operator
/// and builtin failures can say what they expected and what they got.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Type {
    /// The null type (only value: `null`).
    Null,
    /// Boolean type.
    Bool,
    /// 64-bit floating point.
    Float,
    /// A float with no fractional part, within the `i64` range.
    ///
    /// Not a distinct runtime variant; used by bitwise operators, indexing,
    /// and slicing to describe what they accept.
    Integer,
    /// String type.
    String,
    /// Ordered array type.
    Array,
    /// String-keyed object type.
    Object,
    /// Native function reference.
    Function,
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Float => "float",
            Self::Integer => "integer",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
            Self::Function => "function",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
