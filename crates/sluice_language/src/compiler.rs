//! Compiler for transforming syntax trees into bytecode.
//!
//! The compiler walks an [`Expr`] once, threading a constant pool, a symbol
//! table, and a pipe-chain table, and produces an immutable [`Program`].

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use sluice_foundation::{Error, ErrorKind, Result, Value};

use crate::ast::{BinaryOp, Expr, Literal, UnaryOp};
use crate::opcode::{Bytecode, Opcode};

/// A compiled program.
///
/// Cheap to clone and safe to share; run it as many times as needed.
#[derive(Clone, Debug, Default)]
pub struct Program {
    /// The main instruction stream.
    pub code: Bytecode,
    /// Constant pool, indexed by `Constant` and `Call` operands.
    pub constants: Vec<Value>,
    /// Variable names, indexed by `ContextVar` operands.
    pub symbols: Vec<Arc<str>>,
    /// Pipe chains, indexed by `Pipe` operands.
    pub pipes: Vec<PipeChain>,
}

/// The compiled stages of one pipe expression.
#[derive(Clone, Debug, Default)]
pub struct PipeChain {
    /// Stages left to right; stage 0 is always `first`.
    pub stages: Vec<Stage>,
}

/// One compiled pipe stage.
#[derive(Clone, Debug)]
pub struct Stage {
    /// Handler name.
    pub name: Arc<str>,
    /// `$`-prefixed names the stage body refers to, including through
    /// nested pipes.
    pub bindings: Vec<Arc<str>>,
    /// Stage body, terminated by `Return`.
    pub code: Bytecode,
}

impl Stage {
    /// Returns true if the body refers to `name`.
    #[must_use]
    pub fn references(&self, name: &str) -> bool {
        self.bindings.iter().any(|b| &**b == name)
    }
}

impl Program {
    /// Renders a human-readable listing of every instruction stream.
    #[must_use]
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        out.push_str("== main ==\n");
        self.disassemble_code(&self.code, &mut out);
        for (i, chain) in self.pipes.iter().enumerate() {
            for (j, stage) in chain.stages.iter().enumerate() {
                let bindings: Vec<&str> = stage.bindings.iter().map(|b| &**b).collect();
                let _ = writeln!(
                    out,
                    "== pipe {i} stage {j} '{}' [{}] ==",
                    stage.name,
                    bindings.join(", ")
                );
                self.disassemble_code(&stage.code, &mut out);
            }
        }
        out
    }

    fn disassemble_code(&self, code: &Bytecode, out: &mut String) {
        for decoded in code.instructions() {
            let instruction = match decoded {
                Ok(instruction) => instruction,
                Err(e) => {
                    let _ = writeln!(out, "<{e}>");
                    return;
                }
            };
            let _ = write!(out, "{instruction}");
            let first = instruction.operands.first().map(|&o| usize::from(o));
            let note = match (instruction.opcode, first) {
                (Opcode::Constant | Opcode::Call, Some(i)) => {
                    self.constants.get(i).map(|c| format!("{c:?}"))
                }
                (Opcode::ContextVar, Some(i)) => self.symbols.get(i).map(ToString::to_string),
                _ => None,
            };
            match note {
                Some(note) => {
                    let _ = writeln!(out, "    ; {note}");
                }
                None => out.push('\n'),
            }
        }
    }
}

/// Compiler state for transforming a syntax tree into a [`Program`].
#[derive(Default)]
pub struct Compiler {
    /// Constant pool. Every literal occurrence gets its own slot.
    constants: Vec<Value>,
    /// Variable names in first-seen order.
    symbols: Vec<Arc<str>>,
    /// Name to symbol index.
    symbol_index: HashMap<Arc<str>, u16>,
    /// Compiled pipe chains.
    pipes: Vec<PipeChain>,
    /// One binding list per stage currently being compiled, outermost first.
    binding_scopes: Vec<Vec<Arc<str>>>,
}

impl Compiler {
    /// Creates a new compiler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles a syntax tree into a program.
    ///
    /// The compiler is reset afterwards and can be reused.
    ///
    /// # Errors
    /// Returns a compile error if a literal is malformed, a pool or operand
    /// limit is exceeded, or a pipe chain has no stages. No partial program
    /// is produced.
    pub fn compile(&mut self, expr: &Expr) -> Result<Program> {
        let mut code = Bytecode::new();
        let result = self.compile_node(expr, &mut code);
        let state = std::mem::take(self);
        result?;

        let program = Program {
            code,
            constants: state.constants,
            symbols: state.symbols,
            pipes: state.pipes,
        };
        tracing::debug!(
            bytes = program.code.len(),
            constants = program.constants.len(),
            symbols = program.symbols.len(),
            pipes = program.pipes.len(),
            "compiled program"
        );
        Ok(program)
    }

    fn compile_node(&mut self, expr: &Expr, code: &mut Bytecode) -> Result<()> {
        match expr {
            Expr::Literal(literal, _) => self.compile_literal(literal, code)?,
            Expr::Identifier(name, _) => {
                let index = self.symbol(name)?;
                code.emit_u16(Opcode::ContextVar, index);
            }
            Expr::Unary { op, operand, .. } => {
                self.compile_node(operand, code)?;
                code.emit(match op {
                    UnaryOp::Neg => Opcode::Minus,
                    UnaryOp::Not => Opcode::Bang,
                    UnaryOp::BitNot => Opcode::Not,
                });
            }
            Expr::Binary {
                op, left, right, ..
            } => self.compile_binary(*op, left, right, code)?,
            Expr::Array(items, _) => {
                for item in items {
                    self.compile_node(item, code)?;
                }
                let count = count_operand(items.len(), "array elements")?;
                code.emit_u16(Opcode::Array, count);
            }
            Expr::Object(entries, _) => {
                for (key, value) in entries {
                    let index = self.add_constant(Value::from(key.as_str()))?;
                    code.emit_u16(Opcode::Constant, index);
                    self.compile_node(value, code)?;
                }
                let count = count_operand(entries.len(), "object entries")?;
                code.emit_u16(Opcode::Object, count);
            }
            Expr::Index { .. } | Expr::Slice { .. } | Expr::Member { .. } => {
                let mut jumps = Vec::new();
                self.compile_access(expr, code, &mut jumps)?;
                let end = jump_target(code.len())?;
                for jump in jumps {
                    code.patch_jump(jump, end)?;
                }
            }
            Expr::Call { name, args, .. } => {
                for arg in args {
                    self.compile_node(arg, code)?;
                }
                let argc = u8::try_from(args.len()).map_err(|_| {
                    Error::new(ErrorKind::LimitExceeded(format!(
                        "call to '{name}' has {} arguments (max {})",
                        args.len(),
                        u8::MAX
                    )))
                })?;
                let name = self.add_constant(Value::from(name.as_str()))?;
                code.emit_call(name, argc);
            }
            Expr::Pipe { base, stages, .. } => {
                if stages.is_empty() {
                    return Err(Error::new(ErrorKind::Unsupported(
                        "pipe chain with no stages".into(),
                    )));
                }
                let mut compiled = Vec::with_capacity(stages.len() + 1);
                compiled.push(self.compile_stage("first", base)?);
                for stage in stages {
                    compiled.push(self.compile_stage(&stage.name, &stage.body)?);
                }
                let index = u16::try_from(self.pipes.len())
                    .map_err(|_| limit("pipe chains", self.pipes.len()))?;
                self.pipes.push(PipeChain { stages: compiled });
                code.emit_u16(Opcode::Pipe, index);
            }
        }
        Ok(())
    }

    fn compile_literal(&mut self, literal: &Literal, code: &mut Bytecode) -> Result<()> {
        let value = match literal {
            Literal::Null => {
                code.emit(Opcode::Null);
                return Ok(());
            }
            Literal::Bool(true) => {
                code.emit(Opcode::True);
                return Ok(());
            }
            Literal::Bool(false) => {
                code.emit(Opcode::False);
                return Ok(());
            }
            Literal::Number(text) => {
                let n = text.parse::<f64>().map_err(|_| malformed_number(text))?;
                Value::Float(n)
            }
            Literal::String(s) => Value::from(s.as_str()),
        };
        let index = self.add_constant(value)?;
        code.emit_u16(Opcode::Constant, index);
        Ok(())
    }

    fn compile_binary(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        code: &mut Bytecode,
    ) -> Result<()> {
        // `a < b` is `b > a`; `a <= b` is `b >= a`.
        let opcode = match op {
            BinaryOp::Lt | BinaryOp::Le => {
                self.compile_node(right, code)?;
                self.compile_node(left, code)?;
                code.emit(if op == BinaryOp::Lt {
                    Opcode::GreaterThan
                } else {
                    Opcode::GreaterThanOrEqual
                });
                return Ok(());
            }
            BinaryOp::Add => Opcode::Add,
            BinaryOp::Sub => Opcode::Sub,
            BinaryOp::Mul => Opcode::Mul,
            BinaryOp::Div => Opcode::Div,
            BinaryOp::Mod => Opcode::Mod,
            BinaryOp::Pow => Opcode::Pow,
            BinaryOp::And => Opcode::LogicalAnd,
            BinaryOp::Or => Opcode::LogicalOr,
            BinaryOp::Eq => Opcode::Equal,
            BinaryOp::Ne => Opcode::NotEqual,
            BinaryOp::Gt => Opcode::GreaterThan,
            BinaryOp::Ge => Opcode::GreaterThanOrEqual,
            BinaryOp::BitAnd => Opcode::And,
            BinaryOp::BitOr => Opcode::Or,
            BinaryOp::BitXor => Opcode::Xor,
            BinaryOp::Shl => Opcode::ShiftLeft,
            BinaryOp::Shr => Opcode::ShiftRight,
        };
        self.compile_node(left, code)?;
        self.compile_node(right, code)?;
        code.emit(opcode);
        Ok(())
    }

    /// Compiles one link of a postfix accessor chain.
    ///
    /// Optional links record a `JumpIfNull` in `jumps`; the caller patches
    /// them all to the end of the chain.
    fn compile_access(
        &mut self,
        expr: &Expr,
        code: &mut Bytecode,
        jumps: &mut Vec<usize>,
    ) -> Result<()> {
        let (base, optional) = match expr {
            Expr::Index { base, optional, .. }
            | Expr::Slice { base, optional, .. }
            | Expr::Member { base, optional, .. } => (base, *optional),
            other => return self.compile_node(other, code),
        };

        self.compile_access(base, code, jumps)?;
        if optional {
            jumps.push(code.emit_u16(Opcode::JumpIfNull, 0));
        }
        let flag = u8::from(optional);

        match expr {
            Expr::Index { index, .. } => {
                self.compile_node(index, code)?;
                code.emit_u8(Opcode::Index, flag);
            }
            Expr::Slice {
                low, high, step, ..
            } => {
                for bound in [low, high, step] {
                    match bound {
                        Some(bound) => self.compile_node(bound, code)?,
                        None => {
                            code.emit(Opcode::Null);
                        }
                    }
                }
                code.emit_u8(Opcode::Slice, flag);
            }
            Expr::Member { name, .. } => {
                let key = self.add_constant(Value::from(name.as_str()))?;
                code.emit_u16(Opcode::Constant, key);
                code.emit_u8(Opcode::Index, flag);
            }
            _ => {}
        }
        Ok(())
    }

    fn compile_stage(&mut self, name: &str, body: &Expr) -> Result<Stage> {
        self.binding_scopes.push(Vec::new());
        let mut code = Bytecode::new();
        let result = self.compile_node(body, &mut code);
        let bindings = self.binding_scopes.pop().unwrap_or_default();
        result?;
        code.emit(Opcode::Return);
        Ok(Stage {
            name: name.into(),
            bindings,
            code,
        })
    }

    /// Adds a constant to the pool and returns its index.
    fn add_constant(&mut self, value: Value) -> Result<u16> {
        let index = u16::try_from(self.constants.len())
            .map_err(|_| limit("constants", self.constants.len()))?;
        self.constants.push(value);
        Ok(index)
    }

    /// Returns the symbol index for `name`, assigning one on first sight.
    fn symbol(&mut self, name: &str) -> Result<u16> {
        let name: Arc<str> = match self.symbol_index.get_key_value(name) {
            Some((key, &index)) => {
                let key = Arc::clone(key);
                self.record_binding(&key);
                return Ok(index);
            }
            None => name.into(),
        };
        let count = self.symbols.len();
        let index = u16::try_from(count).map_err(|_| limit("symbols", count))?;
        self.symbols.push(Arc::clone(&name));
        self.symbol_index.insert(Arc::clone(&name), index);
        self.record_binding(&name);
        Ok(index)
    }

    /// Records a `$` name in every stage currently being compiled.
    fn record_binding(&mut self, name: &Arc<str>) {
        if !name.starts_with('$') {
            return;
        }
        for scope in &mut self.binding_scopes {
            if !scope.contains(name) {
                scope.push(Arc::clone(name));
            }
        }
    }
}

fn limit(what: &str, count: usize) -> Error {
    Error::new(ErrorKind::LimitExceeded(format!(
        "{what}: {count} exceeds {}",
        u16::MAX
    )))
}

fn count_operand(count: usize, what: &str) -> Result<u16> {
    u16::try_from(count).map_err(|_| limit(what, count))
}

fn malformed_number(text: &str) -> Error {
    Error::new(ErrorKind::MalformedLiteral(format!("invalid number '{text}'")))
}

fn jump_target(offset: usize) -> Result<u16> {
    u16::try_from(offset).map_err(|_| limit("jump target", offset))
}

/// Parses and compiles source into a program.
///
/// # Errors
/// Returns a parse or compile error.
pub fn compile(source: &str) -> Result<Program> {
    crate::parser::parse(source)
        .and_then(|expr| Compiler::new().compile(&expr))
        .map_err(|e| e.in_source(source))
}
