//! Core types, values, and persistent collections for Sluice.
//!
//! This crate provides:
//! - [`Value`] - The core value type for all Sluice data
//! - [`Type`] - Type descriptors for runtime error reporting
//! - [`Error`] - Rich error types with context
//! - Persistent collections ([`LtVec`], [`LtMap`])

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collections;
pub mod error;
#[cfg(feature = "serde")]
mod serde_impl;
pub mod types;
pub mod value;

pub use collections::{LtMap, LtVec};
pub use error::{Error, ErrorContext, ErrorKind};
pub use types::Type;
pub use value::{Boxed, Heap, NativeFn, Value, format_number};

/// Result type alias using Sluice's Error type.
pub type Result<T> = std::result::Result<T, Error>;
