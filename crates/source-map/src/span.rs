//! Half-open byte ranges into template source.

use std::fmt;

use text_size::{TextRange, TextSize};

/// A byte offset into a template string.
pub type ByteOffset = TextSize;

/// A half-open range `[start, end)` of byte offsets in the original template.
///
/// Spans always refer to the document the node was parsed from; they are
/// never relative to an enclosing construct. A node that covers no text
/// (an empty fragment, a synthesized position) uses a zero-length span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// First byte covered by the span.
    pub start: ByteOffset,
    /// First byte past the end of the span.
    pub end: ByteOffset,
}

impl Span {
    /// Creates a span from start and end offsets. `start` must not exceed `end`.
    #[inline]
    pub fn new(start: impl Into<ByteOffset>, end: impl Into<ByteOffset>) -> Self {
        let start = start.into();
        let end = end.into();
        debug_assert!(start <= end, "span start {start:?} past end {end:?}");
        Self { start, end }
    }

    /// Creates a zero-length span at `offset`.
    #[inline]
    pub fn point(offset: impl Into<ByteOffset>) -> Self {
        let offset = offset.into();
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Length of the span in bytes.
    #[inline]
    pub fn len(&self) -> TextSize {
        self.end - self.start
    }

    /// Whether the span covers no text.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `offset` falls inside the span.
    #[inline]
    pub fn contains(&self, offset: ByteOffset) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Whether `other` lies entirely within this span.
    #[inline]
    pub fn contains_span(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// The smallest span covering both `self` and `other`.
    #[inline]
    pub fn cover(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Extracts the covered text from `source`.
    #[inline]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[u32::from(self.start) as usize..u32::from(self.end) as usize]
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", u32::from(self.start), u32::from(self.end))
    }
}

impl From<TextRange> for Span {
    fn from(range: TextRange) -> Self {
        Self {
            start: range.start(),
            end: range.end(),
        }
    }
}

impl From<Span> for TextRange {
    fn from(span: Span) -> Self {
        TextRange::new(span.start, span.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_and_len() {
        let span = Span::new(3u32, 8u32);
        assert_eq!(span.len(), TextSize::from(5));
        assert!(!span.is_empty());
    }

    #[test]
    fn point_is_empty() {
        let span = Span::point(4u32);
        assert!(span.is_empty());
        assert_eq!(span.start, span.end);
    }

    #[test]
    fn contains_is_half_open() {
        let span = Span::new(2u32, 6u32);
        assert!(span.contains(TextSize::from(2)));
        assert!(span.contains(TextSize::from(5)));
        assert!(!span.contains(TextSize::from(6)));
    }

    #[test]
    fn cover_unions() {
        let a = Span::new(1u32, 4u32);
        let b = Span::new(3u32, 9u32);
        assert_eq!(a.cover(b), Span::new(1u32, 9u32));
    }

    #[test]
    fn text_slices_source() {
        let span = Span::new(5u32, 10u32);
        assert_eq!(span.text("hello world"), " worl");
    }

    #[test]
    fn display() {
        assert_eq!(Span::new(0u32, 7u32).to_string(), "0..7");
    }
}
