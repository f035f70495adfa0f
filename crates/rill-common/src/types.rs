use std::fmt::{self, Display, Formatter};
use std::ops::Range;

pub type Spanned<T> = (T, Span);

/// A region of source text: the line on which it starts, and the byte
/// offsets `start..end` into the source.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Span {
    pub line: usize,
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(line: usize, start: usize, end: usize) -> Self {
        Self { line, start, end }
    }

    /// Returns a span covering `self` through `other`.
    pub fn to(&self, other: &Span) -> Span {
        Span { line: self.line, start: self.start, end: other.end.max(self.end) }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}..{}", self.line, self.start, self.end)
    }
}
