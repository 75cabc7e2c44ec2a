//! Source code spans.

use crate::padded_string::PaddedStringView;
use std::fmt;
use std::ops::Range;

/// A half-open byte range `[begin, end)` into a padded source buffer.
///
/// A span is a borrowed slice of the buffer, so it cannot outlive the text it points into. Two
/// spans are equal when they cover the same bytes of the same buffer, not when their contents are
/// equal.
#[derive(Clone, Copy)]
pub struct SourceCodeSpan<'code> {
    bytes: &'code [u8],
}

impl<'code> SourceCodeSpan<'code> {
    /// Span covering exactly `bytes`, which must be a sub-slice of a padded buffer.
    pub fn new(bytes: &'code [u8]) -> Self {
        Self { bytes }
    }

    /// Span covering `range` (byte offsets) of `input`.
    ///
    /// # Panics
    ///
    /// Panics if `range` is reversed or extends past the logical end of `input`.
    pub fn from_range(input: PaddedStringView<'code>, range: Range<usize>) -> Self {
        assert!(range.end <= input.len(), "span {range:?} past end of input");
        Self {
            bytes: &input.padded_bytes()[range],
        }
    }

    /// One-byte span starting at `byte`.
    pub fn unit(byte: &'code u8) -> Self {
        Self {
            bytes: std::slice::from_ref(byte),
        }
    }

    /// Empty span at `offset` of `input`. `offset` may equal `input.len()`.
    pub fn empty_at(input: PaddedStringView<'code>, offset: usize) -> Self {
        Self::from_range(input, offset..offset)
    }

    /// Pointer to the first byte.
    pub fn begin_ptr(&self) -> *const u8 {
        self.bytes.as_ptr()
    }

    /// Pointer one past the last byte.
    pub fn end_ptr(&self) -> *const u8 {
        self.bytes.as_ptr_range().end
    }

    /// The bytes covered by this span.
    pub fn string_view(&self) -> &'code [u8] {
        self.bytes
    }

    /// The covered bytes as text, replacing invalid UTF-8.
    pub fn to_string_lossy(&self) -> std::borrow::Cow<'code, str> {
        String::from_utf8_lossy(self.bytes)
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the span covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Byte offset of the span's start within `input`.
    pub fn begin_offset(&self, input: PaddedStringView<'_>) -> usize {
        input.offset_of(self.begin_ptr())
    }

    /// Byte offset of the span's end within `input`.
    pub fn end_offset(&self, input: PaddedStringView<'_>) -> usize {
        input.offset_of(self.end_ptr())
    }

    /// Byte range of this span within `input`.
    pub fn offsets(&self, input: PaddedStringView<'_>) -> Range<usize> {
        self.begin_offset(input)..self.end_offset(input)
    }
}

impl PartialEq for SourceCodeSpan<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.begin_ptr() == other.begin_ptr() && self.end_ptr() == other.end_ptr()
    }
}

impl Eq for SourceCodeSpan<'_> {}

impl fmt::Debug for SourceCodeSpan<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceCodeSpan({:?})", self.to_string_lossy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::padded_string::PaddedString;

    #[test]
    fn unit_span_covers_one_byte() {
        let input = PaddedString::from("abc");
        let span = SourceCodeSpan::unit(&input.as_bytes()[1]);
        assert_eq!(span.string_view(), b"b");
        assert_eq!(span.offsets(input.view()), 1..2);
    }

    #[test]
    fn spans_compare_by_identity() {
        let input = PaddedString::from("x x");
        let first = SourceCodeSpan::from_range(input.view(), 0..1);
        let second = SourceCodeSpan::from_range(input.view(), 2..3);
        assert_eq!(first.string_view(), second.string_view());
        assert_ne!(first, second);
        assert_eq!(first, SourceCodeSpan::from_range(input.view(), 0..1));
    }

    #[test]
    fn empty_span_at_end_of_input() {
        let input = PaddedString::from("ab");
        let span = SourceCodeSpan::empty_at(input.view(), 2);
        assert!(span.is_empty());
        assert_eq!(span.begin_offset(input.view()), 2);
        assert_eq!(span.end_offset(input.view()), 2);
    }
}
