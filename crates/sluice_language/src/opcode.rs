//! Bytecode instruction set for the Sluice VM.
//!
//! Each instruction is one opcode byte followed by a fixed number of operand
//! bytes determined by the opcode. Multi-byte operands are big-endian. There
//! is no length prefix: a decoder reads the opcode, looks up its widths, and
//! advances by [`Opcode::width`].

#![allow(clippy::doc_markdown)]

use std::fmt;

use sluice_foundation::{Error, ErrorKind, Result};

/// A single opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    // === Literals ===
    /// Push a constant: `[] -> [constants[idx]]`. Operand: `[2]` pool index.
    Constant = 0,
    /// Push `true`.
    True,
    /// Push `false`.
    False,
    /// Push `null`.
    Null,

    // === Data Access ===
    /// Push a variable: `[] -> [value]`. Operand: `[2]` symbol index.
    ContextVar,
    /// Index: `[base, key] -> [value]`. Operand: `[1]` optional flag.
    Index,
    /// Slice: `[base, low, high, step] -> [slice]`. Operand: `[1]` optional flag.
    Slice,

    // === Arithmetic ===
    /// Add: `[a, b] -> [a + b]`
    Add,
    /// Subtract: `[a, b] -> [a - b]`
    Sub,
    /// Multiply: `[a, b] -> [a * b]`
    Mul,
    /// Divide: `[a, b] -> [a / b]`
    Div,
    /// Remainder: `[a, b] -> [a % b]`
    Mod,
    /// Power: `[a, b] -> [a ** b]`
    Pow,
    /// Negate: `[a] -> [-a]`
    Minus,

    // === Logic ===
    /// Logical not: `[a] -> [!truthy(a)]`
    Bang,
    /// `[a, b] -> [a if falsy(a) else b]`
    LogicalAnd,
    /// `[a, b] -> [a if truthy(a) else b]`
    LogicalOr,

    // === Comparison ===
    /// Equal: `[a, b] -> [a == b]`
    Equal,
    /// Not equal: `[a, b] -> [a != b]`
    NotEqual,
    /// Greater than: `[a, b] -> [a > b]`
    GreaterThan,
    /// Greater than or equal: `[a, b] -> [a >= b]`
    GreaterThanOrEqual,

    // === Bitwise ===
    /// Bitwise and: `[a, b] -> [a & b]`
    And,
    /// Bitwise or: `[a, b] -> [a | b]`
    Or,
    /// Bitwise xor: `[a, b] -> [a ^ b]`
    Xor,
    /// Bitwise not: `[a] -> [!a]`
    Not,
    /// Shift left: `[a, b] -> [a << b]`
    ShiftLeft,
    /// Arithmetic shift right: `[a, b] -> [a >> b]`
    ShiftRight,

    // === Collections ===
    /// Build an array from the top `n` values. Operand: `[2]` count.
    Array,
    /// Build an object from the top `n` key/value pairs. Operand: `[2]` count.
    Object,

    // === Control ===
    /// Call a function: `[args...] -> [result]`.
    /// Operands: `[2]` name constant, `[1]` argument count.
    Call,
    /// Run a pipe chain: `[] -> [result]`. Operand: `[2]` chain index.
    Pipe,
    /// Jump to an absolute offset if the top of stack is null, leaving it in
    /// place. Operand: `[2]` target.
    JumpIfNull,
    /// Stop; the top of stack is the result.
    Return,
}

impl Opcode {
    /// Every opcode, indexed by its byte value.
    pub const ALL: [Opcode; 33] = [
        Self::Constant,
        Self::True,
        Self::False,
        Self::Null,
        Self::ContextVar,
        Self::Index,
        Self::Slice,
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::Mod,
        Self::Pow,
        Self::Minus,
        Self::Bang,
        Self::LogicalAnd,
        Self::LogicalOr,
        Self::Equal,
        Self::NotEqual,
        Self::GreaterThan,
        Self::GreaterThanOrEqual,
        Self::And,
        Self::Or,
        Self::Xor,
        Self::Not,
        Self::ShiftLeft,
        Self::ShiftRight,
        Self::Array,
        Self::Object,
        Self::Call,
        Self::Pipe,
        Self::JumpIfNull,
        Self::Return,
    ];

    /// Byte widths of this opcode's operands, in order.
    #[must_use]
    pub const fn operand_widths(self) -> &'static [usize] {
        match self {
            Self::Constant
            | Self::ContextVar
            | Self::Array
            | Self::Object
            | Self::Pipe
            | Self::JumpIfNull => &[2],
            Self::Index | Self::Slice => &[1],
            Self::Call => &[2, 1],
            _ => &[],
        }
    }

    /// Total encoded width in bytes, including the opcode byte.
    #[must_use]
    pub const fn width(self) -> usize {
        match self.operand_widths() {
            [] => 1,
            [a] => 1 + *a,
            [a, b] => 1 + *a + *b,
            _ => 1,
        }
    }
}

impl TryFrom<u8> for Opcode {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self> {
        Self::ALL
            .get(usize::from(byte))
            .copied()
            .ok_or_else(|| Error::new(ErrorKind::InvalidOpcode(byte)))
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A decoded instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    /// Byte offset of the opcode.
    pub offset: usize,
    /// The opcode.
    pub opcode: Opcode,
    /// Operand values, widened to `u16`.
    pub operands: Vec<u16>,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04} {}", self.offset, self.opcode)?;
        for operand in &self.operands {
            write!(f, " {operand}")?;
        }
        Ok(())
    }
}

/// A flat instruction byte stream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bytecode {
    bytes: Vec<u8>,
}

impl Bytecode {
    /// Creates an empty stream.
    #[must_use]
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Returns the encoded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the length in bytes (the offset of the next instruction).
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the stream is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Appends an operand-less instruction and returns its offset.
    pub fn emit(&mut self, op: Opcode) -> usize {
        debug_assert!(op.operand_widths().is_empty(), "{op} takes operands");
        let offset = self.bytes.len();
        self.bytes.push(op as u8);
        offset
    }

    /// Appends an instruction with one 1-byte operand.
    pub fn emit_u8(&mut self, op: Opcode, operand: u8) -> usize {
        debug_assert_eq!(op.operand_widths(), &[1]);
        let offset = self.bytes.len();
        self.bytes.extend([op as u8, operand]);
        offset
    }

    /// Appends an instruction with one 2-byte operand.
    pub fn emit_u16(&mut self, op: Opcode, operand: u16) -> usize {
        debug_assert_eq!(op.operand_widths(), &[2]);
        let offset = self.bytes.len();
        self.bytes.push(op as u8);
        self.bytes.extend(operand.to_be_bytes());
        offset
    }

    /// Appends a `Call` instruction.
    pub fn emit_call(&mut self, name: u16, argc: u8) -> usize {
        let offset = self.bytes.len();
        self.bytes.push(Opcode::Call as u8);
        self.bytes.extend(name.to_be_bytes());
        self.bytes.push(argc);
        offset
    }

    /// Sets the target of the `JumpIfNull` at `offset`.
    ///
    /// # Errors
    /// Returns an internal error if no `JumpIfNull` starts at `offset`.
    pub fn patch_jump(&mut self, offset: usize, target: u16) -> Result<()> {
        let is_jump = self.bytes.get(offset) == Some(&(Opcode::JumpIfNull as u8));
        match self.bytes.get_mut(offset + 1..offset + 3) {
            Some(slot) if is_jump => {
                slot.copy_from_slice(&target.to_be_bytes());
                Ok(())
            }
            _ => Err(Error::internal(format!(
                "no jump instruction at offset {offset}"
            ))),
        }
    }

    /// Reads the opcode at `offset`.
    ///
    /// # Errors
    /// Returns `InvalidOpcode` for an unknown byte and an internal error if
    /// `offset` is past the end.
    pub fn read_opcode(&self, offset: usize) -> Result<Opcode> {
        let byte = self.read_u8(offset)?;
        Opcode::try_from(byte)
    }

    /// Reads one byte at `offset`.
    ///
    /// # Errors
    /// Returns an internal error if `offset` is past the end.
    pub fn read_u8(&self, offset: usize) -> Result<u8> {
        self.bytes
            .get(offset)
            .copied()
            .ok_or_else(|| Error::internal(format!("truncated instruction at offset {offset}")))
    }

    /// Reads a big-endian `u16` at `offset`.
    ///
    /// # Errors
    /// Returns an internal error if fewer than two bytes remain.
    pub fn read_u16(&self, offset: usize) -> Result<u16> {
        let hi = u16::from(self.read_u8(offset)?);
        let lo = u16::from(self.read_u8(offset + 1)?);
        Ok((hi << 8) | lo)
    }

    /// Decodes the instruction at `offset`.
    ///
    /// # Errors
    /// Returns an error if the opcode is unknown or its operands are truncated.
    pub fn decode(&self, offset: usize) -> Result<Instruction> {
        let opcode = self.read_opcode(offset)?;
        let mut operands = Vec::with_capacity(opcode.operand_widths().len());
        let mut at = offset + 1;
        for &width in opcode.operand_widths() {
            let value = if width == 1 {
                u16::from(self.read_u8(at)?)
            } else {
                self.read_u16(at)?
            };
            operands.push(value);
            at += width;
        }
        Ok(Instruction {
            offset,
            opcode,
            operands,
        })
    }

    /// Iterates the decoded instructions in order.
    ///
    /// Iteration stops after the first decoding error.
    pub fn instructions(&self) -> impl Iterator<Item = Result<Instruction>> + '_ {
        let mut offset = 0;
        let mut failed = false;
        std::iter::from_fn(move || {
            if failed || offset >= self.bytes.len() {
                return None;
            }
            let decoded = self.decode(offset);
            match &decoded {
                Ok(instruction) => offset += instruction.opcode.width(),
                Err(_) => failed = true,
            }
            Some(decoded)
        })
    }
}

impl From<Vec<u8>> for Bytecode {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}
