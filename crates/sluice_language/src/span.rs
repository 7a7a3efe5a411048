//! Source locations for tokens and syntax tree nodes.

/// A region of expression source.
///
/// Offsets are byte positions; `line` and `column` locate `start` and are
/// 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Span {
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
    /// Line of `start`.
    pub line: u32,
    /// Column of `start`.
    pub column: u32,
}

impl Span {
    /// Creates a new span.
    #[must_use]
    pub const fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// Creates an empty span at a single position.
    #[must_use]
    pub const fn point(offset: usize, line: u32, column: u32) -> Self {
        Self::new(offset, offset, line, column)
    }

    /// Returns the smallest span covering both `self` and `other`.
    ///
    /// The position is taken from whichever span starts first.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        let end = if self.end > other.end {
            self.end
        } else {
            other.end
        };
        let first = if self.start <= other.start {
            self
        } else {
            other
        };
        Self::new(first.start, end, first.line, first.column)
    }

    /// Returns the covered text, or `None` if the span does not fit `source`.
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.start..self.end)
    }
}
