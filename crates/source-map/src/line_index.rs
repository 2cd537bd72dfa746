//! Offset ↔ line/column conversion.

use text_size::TextSize;

use crate::ByteOffset;

/// A zero-indexed line/column pair. Columns count bytes within the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineCol {
    /// Zero-indexed line number.
    pub line: u32,
    /// Zero-indexed byte column within the line.
    pub col: u32,
}

impl LineCol {
    /// Creates a line/column pair.
    #[inline]
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

/// Precomputed line-start table for a piece of source text.
///
/// Foreign parsers report error locations as line/column; diagnostics in this
/// compiler are byte offsets. The index converts in both directions in
/// O(log n).
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// `line_starts[i]` is the offset at which line `i` begins.
    line_starts: Vec<ByteOffset>,
}

impl LineIndex {
    /// Builds the index for `text`.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::from(0)];
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(TextSize::from(offset as u32 + 1));
            }
        }
        Self { line_starts }
    }

    /// Number of lines in the indexed text.
    #[inline]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Converts a byte offset into a line/column pair.
    pub fn line_col(&self, offset: ByteOffset) -> Option<LineCol> {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.checked_sub(1)?,
        };
        let line_start = self.line_starts[line];
        Some(LineCol {
            line: line as u32,
            col: u32::from(offset) - u32::from(line_start),
        })
    }

    /// Converts a line/column pair back into a byte offset.
    ///
    /// Returns `None` when the line does not exist.
    pub fn offset(&self, position: LineCol) -> Option<ByteOffset> {
        let line_start = self.line_starts.get(position.line as usize)?;
        Some(*line_start + TextSize::from(position.col))
    }

    /// Offset at which `line` begins, if the line exists.
    pub fn line_start(&self, line: u32) -> Option<ByteOffset> {
        self.line_starts.get(line as usize).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn single_line() {
        let index = LineIndex::new("div { color: red }");
        assert_eq!(index.line_count(), 1);
        assert_eq!(index.line_col(TextSize::from(6)), Some(LineCol::new(0, 6)));
    }

    #[test]
    fn line_boundaries() {
        let index = LineIndex::new("a {\n  color: red;\n}\n");
        assert_eq!(index.line_count(), 4);
        assert_eq!(index.line_start(1), Some(TextSize::from(4)));
        assert_eq!(index.line_col(TextSize::from(4)), Some(LineCol::new(1, 0)));
        assert_eq!(index.line_col(TextSize::from(3)), Some(LineCol::new(0, 3)));
    }

    #[test]
    fn offset_round_trips() {
        let text = "one\ntwo\nthree";
        let index = LineIndex::new(text);
        for offset in 0..text.len() as u32 {
            let offset = TextSize::from(offset);
            let position = index.line_col(offset).unwrap();
            assert_eq!(index.offset(position), Some(offset));
        }
    }

    #[test]
    fn missing_line_is_none() {
        let index = LineIndex::new("short");
        assert_eq!(index.offset(LineCol::new(3, 0)), None);
        assert_eq!(index.line_start(9), None);
    }
}
