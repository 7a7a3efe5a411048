//! Lexer, parser, compiler, and bytecode VM for Sluice expressions.
//!
//! This crate provides:
//! - `Lexer` - Tokenization of Sluice source
//! - `Parser` - Parsing tokens into a syntax tree
//! - `Compiler` - Compiling the tree to bytecode
//! - `Vm` - Stack-based bytecode interpreter with pipe stages

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ast;
pub mod compiler;
pub mod config;
pub mod lexer;
pub mod opcode;
pub mod parser;
pub mod registry;
pub mod span;
pub mod token;
pub mod vm;


pub use ast::{BinaryOp, Expr, Literal, PipeStage, UnaryOp};
pub use compiler::{Compiler, PipeChain, Program, Stage, compile};
pub use config::VmConfig;
pub use lexer::Lexer;
pub use opcode::{Bytecode, Instruction, Opcode};
pub use parser::{Parser, parse};
pub use registry::{FunctionRegistry, FunctionRegistryBuilder, PipeRegistry, PipeRegistryBuilder};
pub use span::Span;
pub use token::{Token, TokenKind};
pub use vm::{Context, PipeHandler, StageEvaluator, Vm, eval};
