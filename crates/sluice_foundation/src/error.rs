//! Error types for the Sluice system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;

use thiserror::Error;

use crate::types::Type;

/// The main error type for Sluice operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Pushes a frame onto this error's context, creating it if absent.
    #[must_use]
    pub fn in_frame(mut self, frame: impl Into<String>) -> Self {
        let context = self.context.take().unwrap_or_default();
        self.context = Some(context.with_frame(frame));
        self
    }

    /// Records the expression source this error came from.
    ///
    /// Frames already on the context are kept. Parse errors also record their
    /// line and column. A source that is already set is left alone, so the
    /// innermost caller wins.
    #[must_use]
    pub fn in_source(mut self, source: &str) -> Self {
        let mut context = self.context.take().unwrap_or_default();
        if context.source.is_none() {
            context = context.with_source(source);
            if let ErrorKind::ParseError { line, column, .. } = &self.kind {
                context = context.with_position(*line as usize, *column as usize);
            }
        }
        self.context = Some(context);
        self
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(expected: Type, actual: Type) -> Self {
        Self::new(ErrorKind::TypeMismatch { expected, actual })
    }

    /// Creates an unsupported operand pair error for a binary operator.
    #[must_use]
    pub fn unsupported_operands(op: &'static str, left: Type, right: Type) -> Self {
        Self::new(ErrorKind::UnsupportedOperands { op, left, right })
    }

    /// Creates an undefined variable error.
    #[must_use]
    pub fn undefined_variable(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UndefinedVariable(name.into()))
    }

    /// Creates an unknown function error.
    #[must_use]
    pub fn unknown_function(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownFunction(name.into()))
    }

    /// Creates an unknown pipe handler error.
    #[must_use]
    pub fn unknown_pipe_handler(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownPipeHandler(name.into()))
    }

    /// Creates an arity mismatch error.
    #[must_use]
    pub fn arity_mismatch(expected: impl Into<String>, actual: usize) -> Self {
        Self::new(ErrorKind::ArityMismatch {
            expected: expected.into(),
            actual,
        })
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }

    /// Returns true if this error was raised while compiling rather than running.
    #[must_use]
    pub const fn is_compile_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::ParseError { .. }
                | ErrorKind::MalformedLiteral(_)
                | ErrorKind::LimitExceeded(_)
                | ErrorKind::Unsupported(_)
        )
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Parse error in expression source.
    #[error("parse error at {line}:{column}: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Line number (1-indexed).
        line: u32,
        /// Column number (1-indexed).
        column: u32,
        /// The source line where the error occurred.
        context: String,
    },

    /// A literal in the syntax tree could not be turned into a value.
    #[error("malformed literal: {0}")]
    MalformedLiteral(String),

    /// A compile-time encoding limit was exceeded.
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// The syntax tree contains a construct the compiler cannot lower.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Type mismatch during runtime type checking.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The expected type.
        expected: Type,
        /// The actual type encountered.
        actual: Type,
    },

    /// A binary operator was applied to an operand pair it does not support.
    #[error("unsupported operands for {op}: {left} and {right}")]
    UnsupportedOperands {
        /// The operator symbol.
        op: &'static str,
        /// Type of the left operand.
        left: Type,
        /// Type of the right operand.
        right: Type,
    },

    /// Variable was not bound in the pipe scope or the context.
    #[error("undefined variable: {0}")]
    UndefinedVariable(String),

    /// No builtin or context function with this name.
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    /// No pipe handler registered under this stage name.
    #[error("unknown pipe handler: {0}")]
    UnknownPipeHandler(String),

    /// Wrong number of arguments to function.
    #[error("arity mismatch: expected {expected}, got {actual}")]
    ArityMismatch {
        /// Description of expected arity.
        expected: String,
        /// Actual number of arguments.
        actual: usize,
    },

    /// Index out of bounds.
    #[error("index out of bounds: {index} (length {length})")]
    IndexOutOfBounds {
        /// The index that was accessed.
        index: i64,
        /// The actual length of the collection.
        length: usize,
    },

    /// Object key not present.
    #[error("missing key: {0}")]
    MissingKey(String),

    /// Plain index or slice applied to `null`.
    #[error("cannot access a member of null")]
    NullAccess,

    /// Slice step was zero or negative.
    #[error("slice step must be positive, got {0}")]
    InvalidSliceStep(i64),

    /// Shift amount outside `0..=63`.
    #[error("shift amount out of range: {0}")]
    ShiftOutOfRange(i64),

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// A byte in the instruction stream is not a known opcode.
    #[error("invalid opcode: {0:#04x}")]
    InvalidOpcode(u8),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Expression source or a caller-supplied label.
    pub source: Option<String>,
    /// Line number in source.
    pub line: Option<usize>,
    /// Column number in source.
    pub column: Option<usize>,
    /// Pipe stages and calls the error passed through, innermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source label.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the line and column.
    #[must_use]
    pub fn with_position(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "at {source}")?;
            if let (Some(line), Some(col)) = (self.line, self.column) {
                write!(f, ":{line}:{col}")?;
            }
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}
