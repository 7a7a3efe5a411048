//! Cross-layer integration tests for Sluice
//!
//! Tests that verify correct interaction between multiple crates.

mod end_to_end;
mod stdlib;
