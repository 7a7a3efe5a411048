//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Value, Error, persistent collections, and serde
//! interop.

mod collections;
mod errors;
mod interop;
mod values;
