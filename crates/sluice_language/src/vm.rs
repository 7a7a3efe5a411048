//! Stack-based virtual machine for Sluice bytecode.
//!
//! The VM executes a compiled [`Program`] against a caller [`Context`] and
//! produces a single [`Value`].
//!
//! # Bindings
//!
//! Pipe stages see `$`-prefixed names (`$item`, `$acc`, `$1`) through binding
//! frames owned by the VM. A frame is pushed for each stage evaluation and
//! popped when it finishes, so the caller's context is never written and can
//! be shared between runs.
//!
//! # Registries
//!
//! Function calls and pipe stages are resolved by name when the instruction
//! executes, through a [`FunctionRegistry`] and a [`PipeRegistry`] injected at
//! construction.

#![allow(clippy::too_many_lines)]

mod access;
mod arithmetic;
mod context;
pub mod pipe;

pub use context::Context;
pub use pipe::{PipeHandler, StageEvaluator};

use std::cmp::Ordering;
use std::sync::Arc;

use access::{index_value, slice_value};
use arithmetic::{
    add_values, bit_not_value, bitwise_values, compare_values, div_values, mod_values, mul_values,
    neg_value, pow_values, shift_values, sub_values,
};

use sluice_foundation::{Error, LtMap, NativeFn, Result, Value};

use crate::compiler::Program;
use crate::config::VmConfig;
use crate::opcode::{Bytecode, Opcode};
use crate::registry::{FunctionRegistry, PipeRegistry};

/// One stage's worth of pipe-local bindings.
type Frame = Vec<(Arc<str>, Value)>;

/// Stack-based virtual machine.
pub struct Vm {
    /// Native functions callable from expressions.
    functions: Arc<FunctionRegistry>,
    /// Pipe stage handlers.
    pipes: Arc<PipeRegistry>,
    /// Runtime configuration.
    config: VmConfig,
    /// Operand stack.
    stack: Vec<Value>,
    /// Stack height at which the current instruction stream started.
    floor: usize,
    /// Pipe binding frames, innermost last.
    pub(crate) frames: Vec<Frame>,
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

impl Vm {
    /// Creates a VM with no native functions and the built-in pipe stages.
    #[must_use]
    pub fn new() -> Self {
        Self::with_registries(
            Arc::new(FunctionRegistry::default()),
            Arc::new(PipeRegistry::builtin()),
        )
    }

    /// Creates a VM over shared registries.
    #[must_use]
    pub fn with_registries(functions: Arc<FunctionRegistry>, pipes: Arc<PipeRegistry>) -> Self {
        let config = VmConfig::default();
        Self {
            functions,
            pipes,
            stack: Vec::with_capacity(config.stack_capacity),
            floor: 0,
            frames: Vec::with_capacity(config.frame_capacity),
            config,
        }
    }

    /// Builder method to replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: VmConfig) -> Self {
        self.stack = Vec::with_capacity(config.stack_capacity);
        self.frames = Vec::with_capacity(config.frame_capacity);
        self.config = config;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    /// Returns the function registry.
    #[must_use]
    pub fn functions(&self) -> &Arc<FunctionRegistry> {
        &self.functions
    }

    /// Returns the pipe registry.
    #[must_use]
    pub fn pipes(&self) -> &Arc<PipeRegistry> {
        &self.pipes
    }

    /// Returns the number of live binding frames. Zero between runs.
    #[must_use]
    pub fn binding_depth(&self) -> usize {
        self.frames.len()
    }

    /// Returns the current operand stack height.
    #[must_use]
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Runs a program to completion.
    ///
    /// # Errors
    /// Returns the first runtime error. No partial result is produced.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn run(&mut self, program: &Program, context: &Context) -> Result<Value> {
        self.stack.clear();
        self.frames.clear();
        self.floor = 0;
        let result = self.execute(program, &program.code, context);
        self.frames.clear();
        result
    }

    /// Compiles and runs `source`.
    ///
    /// # Errors
    /// Returns a parse, compile, or runtime error, with `source` recorded on
    /// its context.
    pub fn eval(&mut self, source: &str, context: &Context) -> Result<Value> {
        let program = crate::compiler::compile(source)?;
        self.run(&program, context).map_err(|e| e.in_source(source))
    }

    /// Executes one instruction stream on top of the current stack.
    ///
    /// Values left by the stream are removed on error, and the stream must
    /// leave exactly one value on success.
    pub(crate) fn execute(
        &mut self,
        program: &Program,
        code: &Bytecode,
        context: &Context,
    ) -> Result<Value> {
        let saved = self.floor;
        self.floor = self.stack.len();
        let result = self.execute_internal(program, code, context);
        if result.is_err() {
            self.stack.truncate(self.floor);
        }
        self.floor = saved;
        result
    }

    fn execute_internal(
        &mut self,
        program: &Program,
        code: &Bytecode,
        context: &Context,
    ) -> Result<Value> {
        let mut ip = 0;

        while ip < code.len() {
            let opcode = code.read_opcode(ip)?;
            let mut next = ip + opcode.width();

            if self.config.trace_instructions {
                let depth = self.stack.len() - self.floor;
                tracing::trace!(ip, op = %opcode, depth, "execute");
            }

            match opcode {
                // === Literals ===
                Opcode::Constant => {
                    let index = usize::from(code.read_u16(ip + 1)?);
                    let value = program
                        .constants
                        .get(index)
                        .cloned()
                        .ok_or_else(|| Error::internal(format!("invalid constant index {index}")))?;
                    self.push(value);
                }
                Opcode::True => self.push(Value::Bool(true)),
                Opcode::False => self.push(Value::Bool(false)),
                Opcode::Null => self.push(Value::Null),

                // === Data Access ===
                Opcode::ContextVar => {
                    let index = usize::from(code.read_u16(ip + 1)?);
                    let name = program
                        .symbols
                        .get(index)
                        .ok_or_else(|| Error::internal(format!("invalid symbol index {index}")))?;
                    let value = self
                        .lookup(name, context)
                        .cloned()
                        .ok_or_else(|| Error::undefined_variable(&**name))?;
                    self.push(value);
                }
                Opcode::Index => {
                    let optional = code.read_u8(ip + 1)? != 0;
                    let key = self.pop()?;
                    let base = self.pop()?;
                    self.push(index_value(&base, &key, optional)?);
                }
                Opcode::Slice => {
                    let optional = code.read_u8(ip + 1)? != 0;
                    let step = self.pop()?;
                    let high = self.pop()?;
                    let low = self.pop()?;
                    let base = self.pop()?;
                    self.push(slice_value(&base, &low, &high, &step, optional)?);
                }

                // === Arithmetic ===
                Opcode::Add => self.binary_op(add_values)?,
                Opcode::Sub => self.binary_op(sub_values)?,
                Opcode::Mul => self.binary_op(mul_values)?,
                Opcode::Div => self.binary_op(div_values)?,
                Opcode::Mod => self.binary_op(mod_values)?,
                Opcode::Pow => self.binary_op(pow_values)?,
                Opcode::Minus => {
                    let a = self.pop()?;
                    self.push(neg_value(a)?);
                }

                // === Logic ===
                Opcode::Bang => {
                    let a = self.pop()?;
                    self.push(Value::Bool(!a.is_truthy()));
                }
                Opcode::LogicalAnd => {
                    self.binary_op(|a, b| Ok(if a.is_truthy() { b } else { a }))?;
                }
                Opcode::LogicalOr => {
                    self.binary_op(|a, b| Ok(if a.is_truthy() { a } else { b }))?;
                }

                // === Comparison ===
                Opcode::Equal => self.binary_op(|a, b| Ok(Value::Bool(a == b)))?,
                Opcode::NotEqual => self.binary_op(|a, b| Ok(Value::Bool(a != b)))?,
                Opcode::GreaterThan => {
                    self.binary_op(|a, b| compare_values(&a, &b, Ordering::is_gt))?;
                }
                Opcode::GreaterThanOrEqual => {
                    self.binary_op(|a, b| compare_values(&a, &b, Ordering::is_ge))?;
                }

                // === Bitwise ===
                Opcode::And => self.binary_op(|a, b| bitwise_values(&a, &b, |x, y| x & y))?,
                Opcode::Or => self.binary_op(|a, b| bitwise_values(&a, &b, |x, y| x | y))?,
                Opcode::Xor => self.binary_op(|a, b| bitwise_values(&a, &b, |x, y| x ^ y))?,
                Opcode::Not => {
                    let a = self.pop()?;
                    self.push(bit_not_value(&a)?);
                }
                Opcode::ShiftLeft => self.binary_op(|a, b| shift_values(&a, &b, true))?,
                Opcode::ShiftRight => self.binary_op(|a, b| shift_values(&a, &b, false))?,

                // === Collections ===
                Opcode::Array => {
                    let count = usize::from(code.read_u16(ip + 1)?);
                    let items = self.pop_n(count)?;
                    self.push(Value::array(items));
                }
                Opcode::Object => {
                    let count = usize::from(code.read_u16(ip + 1)?);
                    let flat = self.pop_n(count * 2)?;
                    let mut entries = LtMap::new();
                    let mut iter = flat.into_iter();
                    while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
                        let Value::String(key) = key else {
                            return Err(Error::internal(format!(
                                "object key must be a string, got {}",
                                key.value_type()
                            )));
                        };
                        entries = entries.insert(key, value);
                    }
                    self.push(Value::from(entries));
                }

                // === Control ===
                Opcode::Call => {
                    let index = usize::from(code.read_u16(ip + 1)?);
                    let argc = usize::from(code.read_u8(ip + 3)?);
                    let name = program
                        .constants
                        .get(index)
                        .and_then(Value::as_str)
                        .ok_or_else(|| Error::internal(format!("invalid call index {index}")))?;
                    let func = self.resolve_function(name, context)?;
                    let args = self.pop_n(argc)?;
                    self.push(func.call(&args)?);
                }
                Opcode::Pipe => {
                    let index = usize::from(code.read_u16(ip + 1)?);
                    let result = self.run_pipe(program, index, context)?;
                    self.push(result);
                }
                Opcode::JumpIfNull => {
                    if self.peek()?.is_null() {
                        next = usize::from(code.read_u16(ip + 1)?);
                    }
                }
                Opcode::Return => break,
            }

            ip = next;
        }

        let height = self.stack.len() - self.floor;
        if height != 1 {
            return Err(Error::internal(format!(
                "expected one result value, found {height}"
            )));
        }
        self.pop()
    }

    /// Runs pipe chain `index`, threading each stage's result into the next.
    fn run_pipe(&mut self, program: &Program, index: usize, context: &Context) -> Result<Value> {
        let chain = program
            .pipes
            .get(index)
            .ok_or_else(|| Error::internal(format!("invalid pipe index {index}")))?;
        let pipes = Arc::clone(&self.pipes);

        let mut previous = Value::Null;
        for stage in &chain.stages {
            let handler = pipes
                .get(&stage.name)
                .ok_or_else(|| Error::unknown_pipe_handler(&*stage.name))?;
            tracing::trace!(stage = %stage.name, bindings = ?stage.bindings, "pipe stage");

            let mut evaluator = StageEvaluator {
                vm: self,
                program,
                stage,
                context,
            };
            previous = handler
                .apply(&mut evaluator, previous)
                .map_err(|e| e.in_frame(format!("pipe stage '{}'", stage.name)))?;
        }
        Ok(previous)
    }

    /// Finds a callable: the registry first, then a function-valued variable.
    fn resolve_function(&self, name: &str, context: &Context) -> Result<NativeFn> {
        if let Some(func) = self.functions.get(name) {
            return Ok(*func);
        }
        self.lookup(name, context)
            .and_then(Value::as_function)
            .copied()
            .ok_or_else(|| Error::unknown_function(name))
    }

    /// Resolves a name through the binding frames, innermost first, then the
    /// context.
    fn lookup<'a>(&'a self, name: &str, context: &'a Context) -> Option<&'a Value> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.iter().find(|(n, _)| &**n == name).map(|(_, v)| v))
            .or_else(|| context.get(name))
    }

    // === Stack helpers ===

    fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    fn pop(&mut self) -> Result<Value> {
        if self.stack.len() <= self.floor {
            return Err(Error::internal("stack underflow"));
        }
        self.stack
            .pop()
            .ok_or_else(|| Error::internal("stack underflow"))
    }

    fn peek(&self) -> Result<&Value> {
        if self.stack.len() <= self.floor {
            return Err(Error::internal("stack underflow"));
        }
        self.stack
            .last()
            .ok_or_else(|| Error::internal("stack underflow"))
    }

    /// Pops `count` values, returned in push order.
    fn pop_n(&mut self, count: usize) -> Result<Vec<Value>> {
        let available = self.stack.len() - self.floor;
        if count > available {
            return Err(Error::internal("stack underflow"));
        }
        Ok(self.stack.split_off(self.stack.len() - count))
    }

    fn binary_op(&mut self, op: impl FnOnce(Value, Value) -> Result<Value>) -> Result<()> {
        let b = self.pop()?;
        let a = self.pop()?;
        self.push(op(a, b)?);
        Ok(())
    }
}

/// Compiles and evaluates `source` with an empty context and no native
/// functions.
///
/// # Errors
/// Returns a parse, compile, or runtime error.
pub fn eval(source: &str) -> Result<Value> {
    Vm::new().eval(source, &Context::new())
}
