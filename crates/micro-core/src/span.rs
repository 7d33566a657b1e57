//! Source location tracking.
//!
//! A [`Span`] records where a token or node starts (line and column) and how
//! many bytes it covers. Spans are attached to every syntax-tree node so
//! diagnostics can point back at the offending source.

use std::fmt;

/// Position of a piece of source text.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, byte-based).
    pub col: u32,
    /// Length in bytes.
    pub len: u32,
}

impl Span {
    #[inline]
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Self { line, col, len }
    }

    /// A zero-length span, used for synthesized positions such as end of input.
    #[inline]
    pub fn point(line: u32, col: u32) -> Self {
        Self { line, col, len: 0 }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Extend this span so it ends where `end` ends.
    ///
    /// Spans on different lines keep the start position and only grow the
    /// length; diagnostics only ever print the start.
    pub fn to(self, end: Span) -> Span {
        if end.line == self.line && end.col >= self.col {
            Span::new(self.line, self.col, end.col + end.len - self.col)
        } else {
            Span::new(self.line, self.col, self.len.saturating_add(end.len))
        }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}+{}", self.line, self.col, self.len)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}
