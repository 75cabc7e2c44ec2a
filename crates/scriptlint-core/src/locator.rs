//! Human-readable coordinates for terminal output.

use crate::line_index::LineIndex;
use crate::padded_string::PaddedStringView;
use crate::span::SourceCodeSpan;

/// How columns are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnUnit {
    /// Unicode scalar values (UTF-8 lead bytes).
    #[default]
    CodePoint,
    /// Bytes.
    Byte,
}

/// A 1-based line/column position plus its byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CliSourcePosition {
    /// 1-based line number.
    pub line_number: usize,
    /// 1-based column number.
    pub column_number: usize,
    /// 0-based byte offset in the buffer.
    pub offset: usize,
}

/// A range whose `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CliSourceRange {
    /// First position covered.
    pub begin: CliSourcePosition,
    /// Position just past the last byte covered.
    pub end: CliSourcePosition,
}

/// Maps spans of one buffer to 1-based line/column positions.
#[derive(Debug, Clone)]
pub struct CliLocator<'code> {
    input: PaddedStringView<'code>,
    line_index: LineIndex,
    unit: ColumnUnit,
}

impl<'code> CliLocator<'code> {
    /// Index `input`, counting columns in code points.
    pub fn new(input: PaddedStringView<'code>) -> Self {
        Self::with_column_unit(input, ColumnUnit::default())
    }

    /// Index `input`, counting columns in `unit`.
    pub fn with_column_unit(input: PaddedStringView<'code>, unit: ColumnUnit) -> Self {
        Self {
            input,
            line_index: LineIndex::from_text(input.as_bytes()),
            unit,
        }
    }

    /// Range covering `span`.
    pub fn range(&self, span: SourceCodeSpan<'_>) -> CliSourceRange {
        CliSourceRange {
            begin: self.position_of_offset(span.begin_offset(self.input)),
            end: self.position_of_offset(span.end_offset(self.input)),
        }
    }

    /// Position of the byte `ptr` points at. `ptr` may point one past the end.
    pub fn position(&self, ptr: *const u8) -> CliSourcePosition {
        self.position_of_offset(self.input.offset_of(ptr))
    }

    fn position_of_offset(&self, offset: usize) -> CliSourcePosition {
        position_with_index(self.input.as_bytes(), &self.line_index, self.unit, offset)
    }
}

/// Position of `offset` in `text`, which `line_index` indexes.
pub(crate) fn position_with_index(
    text: &[u8],
    line_index: &LineIndex,
    unit: ColumnUnit,
    offset: usize,
) -> CliSourcePosition {
    let line = line_index.offset_to_line(offset);
    let line_start = line_index.line_to_offset(line);
    let before = &text[line_start..offset];
    let column = match unit {
        ColumnUnit::Byte => before.len(),
        ColumnUnit::CodePoint => before.iter().filter(|&&b| !is_continuation_byte(b)).count(),
    };
    CliSourcePosition {
        line_number: line + 1,
        column_number: column + 1,
        offset,
    }
}

fn is_continuation_byte(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::padded_string::PaddedString;

    #[test]
    fn columns_count_code_points() {
        let input = PaddedString::from("a\n\u{e9}t\u{e9} x");
        let locator = CliLocator::new(input.view());
        let x = input.as_bytes().iter().position(|&b| b == b'x').unwrap();
        let range = locator.range(SourceCodeSpan::from_range(input.view(), x..x + 1));
        assert_eq!(range.begin.line_number, 2);
        assert_eq!(range.begin.column_number, 5);
        assert_eq!(range.end.column_number, 6);
        assert_eq!(range.begin.offset, x);
    }

    #[test]
    fn columns_count_bytes_when_asked() {
        let input = PaddedString::from("\u{e9}x");
        let locator = CliLocator::with_column_unit(input.view(), ColumnUnit::Byte);
        assert_eq!(locator.position(&input.as_bytes()[2]).column_number, 3);
    }
}
