//! Vim quickfix coordinates.

use crate::line_index::LineIndex;
use crate::padded_string::PaddedStringView;
use crate::span::SourceCodeSpan;

/// A position in Vim's convention: 1-based line, 1-based byte column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct VimSourcePosition {
    /// 1-based line number.
    pub lnum: usize,
    /// 1-based byte column.
    pub col: usize,
}

/// An inclusive Vim range: `end` is the position of the last byte of the span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VimSourceRange {
    /// Position of the first byte.
    pub begin: VimSourcePosition,
    /// Position of the last byte; equals `begin` for empty spans.
    pub end: VimSourcePosition,
}

/// Maps spans of one buffer to Vim positions.
#[derive(Debug, Clone)]
pub struct VimLocator<'code> {
    input: PaddedStringView<'code>,
    line_index: LineIndex,
}

impl<'code> VimLocator<'code> {
    /// Index `input`.
    pub fn new(input: PaddedStringView<'code>) -> Self {
        Self {
            input,
            line_index: LineIndex::from_text(input.as_bytes()),
        }
    }

    /// Vim range covering `span`.
    ///
    /// An empty span reports its begin for both ends, except at the end of the buffer where both
    /// columns are 1.
    pub fn range(&self, span: SourceCodeSpan<'_>) -> VimSourceRange {
        let begin_offset = span.begin_offset(self.input);
        let mut begin = self.position_of_offset(begin_offset);
        let end = if span.is_empty() {
            if begin_offset == self.input.len() {
                begin.col = 1;
            }
            begin
        } else {
            self.position_of_offset(span.end_offset(self.input) - 1)
        };
        VimSourceRange { begin, end }
    }

    /// Vim position of the byte `ptr` points at. `ptr` may point one past the end.
    pub fn position(&self, ptr: *const u8) -> VimSourcePosition {
        self.position_of_offset(self.input.offset_of(ptr))
    }

    fn position_of_offset(&self, offset: usize) -> VimSourcePosition {
        let (line, column) = self.line_index.offset_to_line_and_byte_column(offset);
        VimSourcePosition {
            lnum: line + 1,
            col: column + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::padded_string::PaddedString;

    fn pos(lnum: usize, col: usize) -> VimSourcePosition {
        VimSourcePosition { lnum, col }
    }

    #[test]
    fn range_end_is_last_byte() {
        let input = PaddedString::from("to Infinity and beyond");
        let locator = VimLocator::new(input.view());
        let range = locator.range(SourceCodeSpan::from_range(input.view(), 3..11));
        assert_eq!(range.begin, pos(1, 4));
        assert_eq!(range.end, pos(1, 11));
    }

    #[test]
    fn empty_span_in_empty_buffer() {
        let input = PaddedString::default();
        let locator = VimLocator::new(input.view());
        let range = locator.range(SourceCodeSpan::empty_at(input.view(), 0));
        assert_eq!(range.begin, pos(1, 1));
        assert_eq!(range.end, pos(1, 1));
    }

    #[test]
    fn empty_span_at_end_of_buffer_is_column_one() {
        let input = PaddedString::from("abc");
        let locator = VimLocator::new(input.view());
        let range = locator.range(SourceCodeSpan::empty_at(input.view(), 3));
        assert_eq!(range.begin, pos(1, 1));
        assert_eq!(range.end, pos(1, 1));

        let input = PaddedString::from("let x;\nfoo(");
        let locator = VimLocator::new(input.view());
        let range = locator.range(SourceCodeSpan::empty_at(input.view(), input.len()));
        assert_eq!(range.begin, pos(2, 1));
        assert_eq!(range.end, pos(2, 1));
    }

    #[test]
    fn empty_span_inside_buffer_is_its_begin() {
        let input = PaddedString::from("abc");
        let locator = VimLocator::new(input.view());
        let range = locator.range(SourceCodeSpan::empty_at(input.view(), 2));
        assert_eq!(range.begin, pos(1, 3));
        assert_eq!(range.end, pos(1, 3));
    }

    #[test]
    fn positions_after_each_newline_style() {
        let input = PaddedString::from("a\nb\r\nc\rd");
        let locator = VimLocator::new(input.view());
        let bytes = input.as_bytes();
        assert_eq!(locator.position(&bytes[2]), pos(2, 1));
        assert_eq!(locator.position(&bytes[5]), pos(3, 1));
        assert_eq!(locator.position(&bytes[7]), pos(4, 1));
        assert_eq!(locator.position(&bytes[3]), pos(2, 2));
    }
}
