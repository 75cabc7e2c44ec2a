//! LSP coordinates (Language Server Protocol positions)
//!
//! LSP positions are a 0-based line plus a `character` counted in UTF-16 code units from the
//! start of the line. Source buffers are UTF-8, so every conversion walks the line's bytes.

use scriptlint_core::{LineIndex, PaddedString, PaddedStringView, SourceCodeSpan};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::ops::Range;

/// LSP Position (based on UTF-16 code units)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LspPosition {
    /// Line number (0-based)
    pub line: u32,
    /// Character offset (UTF-16 code units, 0-based)
    pub character: u32,
}

impl LspPosition {
    /// Create a new LSP position (UTF-16 based).
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// LSP Range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LspRange {
    /// Range start position (inclusive).
    pub start: LspPosition,
    /// Range end position (exclusive).
    pub end: LspPosition,
}

impl LspRange {
    /// Create a new LSP range.
    pub fn new(start: LspPosition, end: LspPosition) -> Self {
        Self { start, end }
    }
}

/// Maps between byte offsets of one buffer and LSP positions.
#[derive(Debug, Clone)]
pub struct LspLocator<'code> {
    input: PaddedStringView<'code>,
    line_index: Cow<'code, LineIndex>,
}

impl<'code> LspLocator<'code> {
    /// Index `input`.
    pub fn new(input: PaddedStringView<'code>) -> Self {
        Self {
            input,
            line_index: Cow::Owned(LineIndex::from_text(input.as_bytes())),
        }
    }

    /// Locator over `input` reusing an index already built for it.
    pub fn with_line_index(input: PaddedStringView<'code>, line_index: &'code LineIndex) -> Self {
        debug_assert_eq!(line_index.text_len(), input.len());
        Self {
            input,
            line_index: Cow::Borrowed(line_index),
        }
    }

    /// LSP range covering `span`.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if either end of `span` splits a UTF-8 sequence.
    pub fn range(&self, span: SourceCodeSpan<'_>) -> LspRange {
        LspRange::new(
            self.position_of_offset(span.begin_offset(self.input)),
            self.position_of_offset(span.end_offset(self.input)),
        )
    }

    /// Position of the byte `ptr` points at. `ptr` may point one past the end.
    pub fn position(&self, ptr: *const u8) -> LspPosition {
        self.position_of_offset(self.input.offset_of(ptr))
    }

    /// Position of byte `offset`.
    pub fn position_of_offset(&self, offset: usize) -> LspPosition {
        let bytes = self.input.as_bytes();
        debug_assert!(
            offset >= bytes.len() || !is_continuation_byte(bytes[offset]),
            "offset {offset} splits a UTF-8 sequence"
        );
        let offset = offset.min(bytes.len());
        let line = self.line_index.offset_to_line(offset);
        let line_start = self.line_index.line_to_offset(line);
        let character: usize = bytes[line_start..offset]
            .iter()
            .map(|&byte| utf16_units_of_byte(byte))
            .sum();
        LspPosition::new(line as u32, character as u32)
    }

    /// Byte offset of `position`.
    ///
    /// Lines past the end map to the end of the text; characters past the end of a line map to
    /// the line's terminator. A character inside a surrogate pair maps to the start of the pair.
    pub fn offset(&self, position: LspPosition) -> usize {
        let bytes = self.input.as_bytes();
        let Some(line) = self.line_index.line_range(position.line as usize) else {
            return bytes.len();
        };
        let target = position.character as usize;
        let mut units = 0;
        let mut offset = line.start;
        while offset < line.end && !matches!(bytes[offset], b'\n' | b'\r') {
            let width = utf16_units_of_byte(bytes[offset]);
            if width > 0 && units + width > target {
                break;
            }
            units += width;
            offset += 1;
            while offset < line.end && is_continuation_byte(bytes[offset]) {
                offset += 1;
            }
        }
        offset
    }

    /// Byte range covered by `range`.
    pub fn offsets(&self, range: LspRange) -> Range<usize> {
        let start = self.offset(range.start);
        let end = self.offset(range.end).max(start);
        start..end
    }
}

/// UTF-16 code units contributed by the character starting with `byte` (0 for continuations).
fn utf16_units_of_byte(byte: u8) -> usize {
    match byte {
        0x00..=0x7F | 0xC0..=0xEF => 1,
        0xF0..=0xFF => 2,
        _ => 0,
    }
}

fn is_continuation_byte(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

/// An open document's text plus its line index, edited with LSP ranges.
#[derive(Debug, Clone)]
pub struct LspDocumentText {
    text: PaddedString,
    line_index: LineIndex,
}

impl LspDocumentText {
    /// Document containing `text`.
    pub fn new(text: &[u8]) -> Self {
        Self {
            text: PaddedString::new(text),
            line_index: LineIndex::from_text(text),
        }
    }

    /// The current text.
    pub fn view(&self) -> PaddedStringView<'_> {
        self.text.view()
    }

    /// Locator for the current text, sharing this document's index.
    pub fn locator(&self) -> LspLocator<'_> {
        LspLocator::with_line_index(self.text.view(), &self.line_index)
    }

    /// Replace the whole text.
    pub fn set_text(&mut self, text: &[u8]) {
        self.text.assign(text);
        self.line_index = LineIndex::from_text(text);
    }

    /// Replace the text in `range` with `replacement`, patching the line index.
    pub fn replace_text(&mut self, range: LspRange, replacement: &[u8]) {
        let offsets = self.locator().offsets(range);
        self.text.replace_range(offsets.clone(), replacement);
        self.line_index.replace_text(offsets, self.text.as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn span(input: &PaddedString, range: Range<usize>) -> SourceCodeSpan<'_> {
        SourceCodeSpan::from_range(input.view(), range)
    }

    #[test]
    fn characters_count_utf16_units() {
        // "é" is one unit, "😀" is two.
        let input = PaddedString::from("a\u{e9}\u{1f600}x\nyz");
        let locator = LspLocator::new(input.view());
        let x = input.as_bytes().iter().position(|&b| b == b'x').unwrap();
        assert_eq!(
            locator.range(span(&input, x..x + 1)),
            LspRange::new(LspPosition::new(0, 4), LspPosition::new(0, 5))
        );
        let z = input.len() - 1;
        assert_eq!(locator.position_of_offset(z), LspPosition::new(1, 1));
        assert_eq!(locator.offset(LspPosition::new(0, 4)), x);
        assert_eq!(locator.offset(LspPosition::new(1, 1)), z);
    }

    #[test]
    fn line_terminators() {
        let input = PaddedString::from("a\r\nb\rc\nd");
        let locator = LspLocator::new(input.view());
        assert_eq!(locator.position_of_offset(3), LspPosition::new(1, 0));
        assert_eq!(locator.position_of_offset(5), LspPosition::new(2, 0));
        assert_eq!(locator.position_of_offset(7), LspPosition::new(3, 0));
        // Past the end of a line: its terminator.
        assert_eq!(locator.offset(LspPosition::new(0, 99)), 1);
        assert_eq!(locator.offset(LspPosition::new(99, 0)), input.len());
    }

    #[test]
    fn offsets_inside_surrogate_pairs_round_down() {
        let input = PaddedString::from("\u{1f600}!");
        let locator = LspLocator::new(input.view());
        assert_eq!(locator.offset(LspPosition::new(0, 1)), 0);
        assert_eq!(locator.offset(LspPosition::new(0, 2)), 4);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "splits a UTF-8 sequence")]
    fn splitting_a_character_is_a_bug() {
        let input = PaddedString::from("\u{e9}");
        LspLocator::new(input.view()).position_of_offset(1);
    }

    #[test]
    fn incremental_edits_match_fresh_index() {
        let mut document = LspDocumentText::new("let x = 1;\nlet y = 2;\n".as_bytes());
        document.replace_text(
            LspRange::new(LspPosition::new(0, 4), LspPosition::new(1, 5)),
            "\u{1f600} = 3;\r\nconst z".as_bytes(),
        );
        assert_eq!(
            document.view().as_bytes(),
            "let \u{1f600} = 3;\r\nconst z = 2;\n".as_bytes()
        );
        assert_eq!(document.line_index, LineIndex::from_text(document.text.as_bytes()));
    }

    #[test]
    fn random_edits_match_fresh_index() {
        let alphabet = ["a", "\n", "\r", "\r\n", "\u{e9}", "\u{1f600}", " "];
        let mut rng = StdRng::seed_from_u64(0x15b);
        let mut document = LspDocumentText::new(b"");
        let mut expected = String::new();
        for _ in 0..500 {
            let locator = document.locator();
            let end_offset = locator.position_of_offset(expected.len());
            let pick = |rng: &mut StdRng| {
                let line = rng.gen_range(0..=end_offset.line + 1);
                LspPosition::new(line, rng.gen_range(0..4))
            };
            let (a, b) = (pick(&mut rng), pick(&mut rng));
            let range = LspRange::new(a.min(b), a.max(b));
            let offsets = locator.offsets(range);

            let replacement: String = (0..rng.gen_range(0..4))
                .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
                .collect();
            expected.replace_range(offsets, &replacement);
            document.replace_text(range, replacement.as_bytes());

            assert_eq!(document.view().as_bytes(), expected.as_bytes());
            assert_eq!(document.line_index, LineIndex::from_text(expected.as_bytes()));
        }
    }
}
