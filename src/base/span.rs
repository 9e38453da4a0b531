//! Byte offsets and their line/column equivalents.

pub use text_size::{TextRange, TextSize};

use super::position::{Position, Span};

/// A zero-based line/column pair. Columns count bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

/// Pre-computed line starts for offset → line/column conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineIndex {
    /// `line_starts[0]` is always 0; `line_starts[n]` is the offset of line `n`.
    line_starts: Vec<TextSize>,
    len: TextSize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::from(0)];
        for (i, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(TextSize::from((i + 1) as u32));
            }
        }
        Self {
            line_starts,
            len: TextSize::of(text),
        }
    }

    /// Convert an offset to a line/column pair.
    ///
    /// Offsets past the end of the text are clamped to the end.
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        LineCol {
            line: line as u32,
            col: u32::from(offset - self.line_starts[line]),
        }
    }

    /// Convert a line/column pair back to an offset, if it lies inside the text.
    pub fn offset(&self, line_col: LineCol) -> Option<TextSize> {
        let start = *self.line_starts.get(line_col.line as usize)?;
        let line_end = self
            .line_starts
            .get(line_col.line as usize + 1)
            .copied()
            .unwrap_or(self.len);
        let offset = start + TextSize::from(line_col.col);
        (offset <= line_end).then_some(offset)
    }

    /// Convert a byte range into an editor-facing span.
    pub fn span(&self, range: TextRange) -> Span {
        let start = self.line_col(range.start());
        let end = self.line_col(range.end());
        Span::new(
            Position::new(start.line as usize, start.col as usize),
            Position::new(end.line as usize, end.col as usize),
        )
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}
