//! Zero-padded source buffers.
//!
//! The lexer peeks a fixed number of bytes ahead without checking for the end of input. To make
//! that sound, every source buffer is followed by [`PADDING_SIZE`] NUL bytes which are never part
//! of the logical text.
//!
//! ```text
//! [source bytes ..., 0x00 x PADDING_SIZE]
//!  ^                 ^
//!  0                 len()
//! ```

use std::fmt;
use std::ops::Range;

/// Number of NUL bytes guaranteed after the logical end of every [`PaddedString`].
pub const PADDING_SIZE: usize = 64;

/// Owned source text followed by [`PADDING_SIZE`] NUL bytes.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct PaddedString {
    /// `[text..., 0 x PADDING_SIZE]`. Empty only for the default value, which behaves as if padded.
    data: Vec<u8>,
}

impl PaddedString {
    /// Copy `bytes` into a new padded buffer.
    pub fn new(bytes: &[u8]) -> Self {
        let mut data = Vec::with_capacity(bytes.len() + PADDING_SIZE);
        data.extend_from_slice(bytes);
        data.resize(bytes.len() + PADDING_SIZE, 0);
        Self { data }
    }

    /// Logical length in bytes (excluding padding).
    pub fn len(&self) -> usize {
        self.data.len().saturating_sub(PADDING_SIZE)
    }

    /// Returns `true` if the logical text is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Length including padding. Always `len() + PADDING_SIZE`.
    pub fn padded_len(&self) -> usize {
        self.len() + PADDING_SIZE
    }

    /// Pointer to the first byte of the buffer.
    pub fn data(&self) -> *const u8 {
        self.padded_bytes().as_ptr()
    }

    /// The logical text.
    pub fn as_bytes(&self) -> &[u8] {
        &self.padded_bytes()[..self.len()]
    }

    /// The logical text followed by the NUL padding.
    pub fn padded_bytes(&self) -> &[u8] {
        if self.data.is_empty() {
            &EMPTY_PADDING
        } else {
            &self.data
        }
    }

    /// Borrow the buffer as a [`PaddedStringView`].
    pub fn view(&self) -> PaddedStringView<'_> {
        PaddedStringView {
            padded: self.padded_bytes(),
        }
    }

    /// Resize the logical text, filling new bytes with NUL and keeping the padding intact.
    pub fn resize(&mut self, new_len: usize) {
        self.data.resize(new_len, 0);
        self.data.resize(new_len + PADDING_SIZE, 0);
    }

    /// Replace the whole logical text.
    pub fn assign(&mut self, bytes: &[u8]) {
        self.data.clear();
        self.data.extend_from_slice(bytes);
        self.data.resize(bytes.len() + PADDING_SIZE, 0);
    }

    /// Replace `range` (byte offsets into the logical text) with `replacement`.
    ///
    /// # Panics
    ///
    /// Panics if `range` is not within `0..=len()`.
    pub fn replace_range(&mut self, range: Range<usize>, replacement: &[u8]) {
        let len = self.len();
        assert!(
            range.start <= range.end && range.end <= len,
            "range {range:?} out of bounds for length {len}"
        );
        if self.data.is_empty() {
            self.data.resize(PADDING_SIZE, 0);
        }
        self.data.splice(range, replacement.iter().copied());
        debug_assert!(self.data[self.data.len() - PADDING_SIZE..]
            .iter()
            .all(|&b| b == 0));
    }
}

static EMPTY_PADDING: [u8; PADDING_SIZE] = [0; PADDING_SIZE];

impl From<&str> for PaddedString {
    fn from(text: &str) -> Self {
        Self::new(text.as_bytes())
    }
}

impl From<&[u8]> for PaddedString {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }
}

impl fmt::Debug for PaddedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PaddedString")
            .field(&String::from_utf8_lossy(self.as_bytes()))
            .finish()
    }
}

/// A borrowed view of a padded buffer.
///
/// Views are what the lexer, locators and reporters hold; they are `Copy` and tie every
/// [`SourceCodeSpan`](crate::SourceCodeSpan) produced from them to the buffer's lifetime.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PaddedStringView<'a> {
    padded: &'a [u8],
}

impl<'a> PaddedStringView<'a> {
    /// Logical length in bytes.
    pub fn len(&self) -> usize {
        self.padded.len() - PADDING_SIZE
    }

    /// Returns `true` if the logical text is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pointer to the first byte.
    pub fn data(&self) -> *const u8 {
        self.padded.as_ptr()
    }

    /// The logical text.
    pub fn as_bytes(&self) -> &'a [u8] {
        &self.padded[..self.len()]
    }

    /// The logical text followed by the NUL padding.
    pub fn padded_bytes(&self) -> &'a [u8] {
        self.padded
    }

    /// Byte offset of `ptr` relative to the start of this buffer.
    ///
    /// `ptr` must point into the padded buffer (or one past the logical end).
    pub fn offset_of(&self, ptr: *const u8) -> usize {
        let offset = (ptr as usize).wrapping_sub(self.data() as usize);
        debug_assert!(
            offset <= self.padded.len(),
            "pointer does not belong to this buffer"
        );
        offset
    }
}

impl fmt::Debug for PaddedStringView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PaddedStringView")
            .field(&String::from_utf8_lossy(self.as_bytes()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_padded_with_zeros() {
        let s = PaddedString::from("hello");
        assert_eq!(s.len(), 5);
        assert_eq!(s.padded_len(), 5 + PADDING_SIZE);
        assert_eq!(s.as_bytes(), b"hello");
        assert!(s.padded_bytes()[5..].iter().all(|&b| b == 0));
    }

    #[test]
    fn default_buffer_is_empty_but_padded() {
        let s = PaddedString::default();
        assert!(s.is_empty());
        assert_eq!(s.padded_bytes().len(), PADDING_SIZE);
        assert_eq!(s.view().len(), 0);
    }

    #[test]
    fn resize_keeps_padding() {
        let mut s = PaddedString::from("abc");
        s.resize(6);
        assert_eq!(s.as_bytes(), b"abc\0\0\0");
        s.resize(1);
        assert_eq!(s.as_bytes(), b"a");
        assert!(s.padded_bytes()[1..].iter().all(|&b| b == 0));
        assert_eq!(s.padded_len(), 1 + PADDING_SIZE);
    }

    #[test]
    fn replace_range_shifts_padding() {
        let mut s = PaddedString::from("let x;");
        s.replace_range(4..5, b"value");
        assert_eq!(s.as_bytes(), b"let value;");
        s.replace_range(0..4, b"");
        assert_eq!(s.as_bytes(), b"value;");
        assert!(s.padded_bytes()[6..].iter().all(|&b| b == 0));
    }

    #[test]
    fn replace_range_on_default_buffer() {
        let mut s = PaddedString::default();
        s.replace_range(0..0, b"x");
        assert_eq!(s.as_bytes(), b"x");
        assert_eq!(s.padded_len(), 1 + PADDING_SIZE);
    }

    #[test]
    fn view_offsets() {
        let s = PaddedString::from("abc");
        let view = s.view();
        let c = &view.as_bytes()[2];
        assert_eq!(view.offset_of(c), 2);
        assert_eq!(view.offset_of(view.as_bytes().as_ptr_range().end), 3);
    }
}
