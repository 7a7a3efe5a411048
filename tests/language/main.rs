//! Integration tests for Layer 1: Language
//!
//! Tests for the parser, compiler, VM, and pipe stages.

mod compiler;
mod parser;
mod pipes;
mod vm;
