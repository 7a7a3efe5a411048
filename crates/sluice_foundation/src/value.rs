//! Core value type for all Sluice data.

use std::fmt;
use std::sync::Arc;

use crate::collections::{LtMap, LtVec};
use crate::types::Type;

/// Core value type for all Sluice data.
///
/// Primitives are stored inline. Arrays, objects, and functions live behind a
/// single shared [`Boxed`] reference, so pushing one through the VM stack or
/// binding it as a pipe variable never copies it.
///
/// There is no integer variant: every numeric input is normalized to `Float`.
#[derive(Clone, Default)]
pub enum Value {
    /// The null value (represents absence).
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit floating point.
    Float(f64),
    /// String value.
    String(Arc<str>),
    /// Reference to a heap-allocated array, object, or function.
    Boxed(Boxed),
}

/// Shared reference to a heap value.
///
/// Cloning is a reference-count increment; the heap cell itself is never
/// copied, so two clones always compare [`ptr_eq`](Boxed::ptr_eq).
#[derive(Clone)]
pub struct Boxed(Arc<Heap>);

/// The heap cell behind a [`Boxed`] reference.
pub enum Heap {
    /// Ordered array of values.
    Array(LtVec<Value>),
    /// String-keyed object.
    Object(LtMap<Value>),
    /// Native function.
    Function(NativeFn),
}

/// Native function callable from Sluice expressions.
#[derive(Clone, Copy)]
pub struct NativeFn {
    /// Function name, used for registry lookup and diagnostics.
    pub name: &'static str,
    /// Function pointer.
    pub func: fn(&[Value]) -> crate::Result<Value>,
}

impl NativeFn {
    /// Creates a native function.
    #[must_use]
    pub const fn new(name: &'static str, func: fn(&[Value]) -> crate::Result<Value>) -> Self {
        Self { name, func }
    }

    /// Invokes the function.
    ///
    /// # Errors
    /// Returns whatever error the function itself reports.
    pub fn call(&self, args: &[Value]) -> crate::Result<Value> {
        (self.func)(args)
    }
}

impl Boxed {
    /// Wraps a heap cell in a new shared reference.
    #[must_use]
    pub fn new(heap: Heap) -> Self {
        Self(Arc::new(heap))
    }

    /// Returns the heap cell.
    #[must_use]
    pub fn heap(&self) -> &Heap {
        &self.0
    }

    /// Returns true if both references point at the same heap cell.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Returns the type of the referenced value.
    #[must_use]
    pub fn value_type(&self) -> Type {
        match self.heap() {
            Heap::Array(_) => Type::Array,
            Heap::Object(_) => Type::Object,
            Heap::Function(_) => Type::Function,
        }
    }
}

impl Value {
    /// Creates an array value.
    #[must_use]
    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Self::Boxed(Boxed::new(Heap::Array(items.into_iter().collect())))
    }

    /// Creates an object value.
    #[must_use]
    pub fn object<K: Into<Arc<str>>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self::Boxed(Boxed::new(Heap::Object(entries.into_iter().collect())))
    }

    /// Creates a function value.
    #[must_use]
    pub fn function(func: NativeFn) -> Self {
        Self::Boxed(Boxed::new(Heap::Function(func)))
    }

    /// Returns the type of this value.
    #[must_use]
    pub fn value_type(&self) -> Type {
        match self {
            Self::Null => Type::Null,
            Self::Bool(_) => Type::Bool,
            Self::Float(_) => Type::Float,
            Self::String(_) => Type::String,
            Self::Boxed(b) => b.value_type(),
        }
    }

    /// Returns true if this value is null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true if this value is truthy.
    ///
    /// `null`, `false`, `0`, the empty string, and empty arrays and objects
    /// are falsy. Everything else, including NaN and functions, is truthy.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Float(n) => *n != 0.0,
            Self::String(s) => !s.is_empty(),
            Self::Boxed(b) => match b.heap() {
                Heap::Array(items) => !items.is_empty(),
                Heap::Object(entries) => !entries.is_empty(),
                Heap::Function(_) => true,
            },
        }
    }

    /// Attempts to extract a boolean value.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to extract a float value.
    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract an integral float as `i64`.
    ///
    /// Returns `None` for non-floats, fractional values, and values outside
    /// the `i64` range.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Float(n) if n.fract() == 0.0 && *n >= i64::MIN as f64 && *n < i64::MAX as f64 => {
                Some(*n as i64)
            }
            _ => None,
        }
    }

    /// Attempts to extract a string reference.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to extract the boxed reference.
    #[must_use]
    pub const fn as_boxed(&self) -> Option<&Boxed> {
        match self {
            Self::Boxed(b) => Some(b),
            _ => None,
        }
    }

    /// Attempts to extract an array reference.
    #[must_use]
    pub fn as_array(&self) -> Option<&LtVec<Value>> {
        match self.as_boxed()?.heap() {
            Heap::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Attempts to extract an object reference.
    #[must_use]
    pub fn as_object(&self) -> Option<&LtMap<Value>> {
        match self.as_boxed()?.heap() {
            Heap::Object(entries) => Some(entries),
            _ => None,
        }
    }

    /// Attempts to extract a native function.
    #[must_use]
    pub fn as_function(&self) -> Option<&NativeFn> {
        match self.as_boxed()?.heap() {
            Heap::Function(func) => Some(func),
            _ => None,
        }
    }
}

/// Formats a float the way Sluice prints numbers.
///
/// Integral values below 1e15 in magnitude print without a fractional part,
/// so `3.0` prints as `3`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Boxed(a), Self::Boxed(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialEq for Boxed {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        match (self.heap(), other.heap()) {
            (Heap::Array(a), Heap::Array(b)) => a == b,
            (Heap::Object(a), Heap::Object(b)) => a == b,
            (Heap::Function(a), Heap::Function(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialEq for NativeFn {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && std::ptr::fn_addr_eq(self.func, other.func)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Float(n) => write!(f, "{}", format_number(*n)),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Boxed(b) => write!(f, "{b:?}"),
        }
    }
}

impl fmt::Debug for Boxed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.heap() {
            Heap::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item:?}")?;
                }
                write!(f, "]")
            }
            Heap::Object(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v:?}")?;
                }
                write!(f, "}}")
            }
            Heap::Function(func) => write!(f, "{func:?}"),
        }
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.name)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Top-level strings print bare; nested ones keep their quotes.
            Self::String(s) => write!(f, "{s}"),
            other => fmt::Debug::fmt(other, f),
        }
    }
}

// Convenience From implementations

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Self::Float(f64::from(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Float(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Float(f64::from(n))
    }
}

impl From<i64> for Value {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: i64) -> Self {
        Self::Float(n as f64)
    }
}

impl From<usize> for Value {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: usize) -> Self {
        Self::Float(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s.into())
    }
}

impl From<Arc<str>> for Value {
    fn from(s: Arc<str>) -> Self {
        Self::String(s)
    }
}

impl From<LtVec<Value>> for Value {
    fn from(items: LtVec<Value>) -> Self {
        Self::Boxed(Boxed::new(Heap::Array(items)))
    }
}

impl From<LtMap<Value>> for Value {
    fn from(entries: LtMap<Value>) -> Self {
        Self::Boxed(Boxed::new(Heap::Object(entries)))
    }
}

impl From<NativeFn> for Value {
    fn from(func: NativeFn) -> Self {
        Self::function(func)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::array(v.into_iter().map(Into::into))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
