//! Syntax tree for Sluice expressions.
//!
//! The parser produces these nodes and the compiler consumes them. Operators
//! are closed enums, so an unknown operator can never reach the compiler.

use std::fmt;

use crate::span::Span;

/// An expression node.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// A literal like `1.5`, `"hi"`, `true`, or `null`.
    Literal(Literal, Span),
    /// A variable reference like `score` or `$item`.
    Identifier(String, Span),
    /// A prefix operator applied to one operand.
    Unary {
        /// The operator.
        op: UnaryOp,
        /// The operand.
        operand: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// An infix operator applied to two operands.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// Array literal like `[1, 2, 3]`.
    Array(Vec<Expr>, Span),
    /// Object literal like `{a: 1, "b": 2}`, in source order.
    Object(Vec<(String, Expr)>, Span),
    /// Index access `base[index]` or `base?[index]`.
    Index {
        /// The collection being indexed.
        base: Box<Expr>,
        /// The key or position.
        index: Box<Expr>,
        /// True for `?[`.
        optional: bool,
        /// Source span.
        span: Span,
    },
    /// Slice `base[low:high:step]`; omitted bounds are `None`.
    Slice {
        /// The collection being sliced.
        base: Box<Expr>,
        /// Inclusive lower bound.
        low: Option<Box<Expr>>,
        /// Exclusive upper bound.
        high: Option<Box<Expr>>,
        /// Step.
        step: Option<Box<Expr>>,
        /// True for `?[`.
        optional: bool,
        /// Source span.
        span: Span,
    },
    /// Member access `base.name` or `base?.name`.
    Member {
        /// The object.
        base: Box<Expr>,
        /// The member name.
        name: String,
        /// True for `?.`.
        optional: bool,
        /// Source span.
        span: Span,
    },
    /// Function call `name(args...)`.
    Call {
        /// Function name.
        name: String,
        /// Arguments in source order.
        args: Vec<Expr>,
        /// Source span.
        span: Span,
    },
    /// Pipe chain `base |stage: body |stage: body ...`.
    Pipe {
        /// The seed expression.
        base: Box<Expr>,
        /// Stages after the seed, left to right.
        stages: Vec<PipeStage>,
        /// Source span.
        span: Span,
    },
}

impl Expr {
    /// Returns the source span of this node.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Literal(_, s)
            | Self::Identifier(_, s)
            | Self::Array(_, s)
            | Self::Object(_, s) => *s,
            Self::Unary { span, .. }
            | Self::Binary { span, .. }
            | Self::Index { span, .. }
            | Self::Slice { span, .. }
            | Self::Member { span, .. }
            | Self::Call { span, .. }
            | Self::Pipe { span, .. } => *span,
        }
    }

    /// Returns true if this node is an accessor that may start or continue a
    /// postfix chain.
    #[must_use]
    pub const fn is_accessor(&self) -> bool {
        matches!(
            self,
            Self::Index { .. } | Self::Slice { .. } | Self::Member { .. }
        )
    }
}

/// A literal value.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    /// `null`
    Null,
    /// `true` or `false`
    Bool(bool),
    /// A number in its source spelling, converted at compile time.
    Number(String),
    /// A string with escapes resolved.
    String(String),
}

/// One `|name: body` stage of a pipe chain.
#[derive(Clone, Debug, PartialEq)]
pub struct PipeStage {
    /// Handler name, like `map` or `reduce`.
    pub name: String,
    /// Stage body.
    pub body: Expr,
    /// Source span of the whole stage.
    pub span: Span,
}

/// Prefix operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `!x`
    Not,
    /// `~x`
    BitNot,
}

/// Infix operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `**`
    Pow,
    /// `&&`
    And,
    /// `||`
    Or,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `&`
    BitAnd,
    /// `|`
    BitOr,
    /// `^`
    BitXor,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
}

impl BinaryOp {
    /// Binding power; higher binds tighter.
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::BitOr => 3,
            Self::BitXor => 4,
            Self::BitAnd => 5,
            Self::Eq | Self::Ne => 6,
            Self::Lt | Self::Le | Self::Gt | Self::Ge => 7,
            Self::Shl | Self::Shr => 8,
            Self::Add | Self::Sub => 9,
            Self::Mul | Self::Div | Self::Mod => 10,
            Self::Pow => 11,
        }
    }

    /// Returns true for right-associative operators.
    #[must_use]
    pub const fn is_right_assoc(self) -> bool {
        matches!(self, Self::Pow)
    }

    /// Source spelling of the operator.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Pow => "**",
            Self::And => "&&",
            Self::Or => "||",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::Shl => "<<",
            Self::Shr => ">>",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Neg => "-",
            Self::Not => "!",
            Self::BitNot => "~",
        })
    }
}
