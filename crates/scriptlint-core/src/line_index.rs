//! Logical line index.
//!
//! Stores the byte offset at which each line starts. Offset `0` always starts a line; every
//! `\n`, every lone `\r`, and every `\r\n` pair ends one. The index can be patched in place when a
//! byte range of the text is replaced, which is how interactive documents keep their locators
//! current on each keystroke.

use std::ops::Range;

/// Ordered byte offsets of line starts for one text buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Strictly increasing. `line_starts[0] == 0`.
    line_starts: Vec<usize>,
    /// Length of the indexed text in bytes.
    text_len: usize,
}

impl LineIndex {
    /// Index of the empty text (one line).
    pub fn new() -> Self {
        Self {
            line_starts: vec![0],
            text_len: 0,
        }
    }

    /// Build the index for `text`.
    pub fn from_text(text: &[u8]) -> Self {
        let mut line_starts = vec![0];
        let mut i = 0;
        while i < text.len() {
            match text[i] {
                b'\n' => line_starts.push(i + 1),
                b'\r' => {
                    if text.get(i + 1) == Some(&b'\n') {
                        i += 1;
                    }
                    line_starts.push(i + 1);
                }
                _ => {}
            }
            i += 1;
        }
        Self {
            line_starts,
            text_len: text.len(),
        }
    }

    /// Total line count. An empty text has one line; a trailing newline starts another.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Length of the indexed text in bytes.
    pub fn text_len(&self) -> usize {
        self.text_len
    }

    /// All line start offsets.
    pub fn line_starts(&self) -> &[usize] {
        &self.line_starts
    }

    /// Byte offset at which `line` (0-based) starts. Lines past the end map to the text length.
    pub fn line_to_offset(&self, line: usize) -> usize {
        self.line_starts.get(line).copied().unwrap_or(self.text_len)
    }

    /// 0-based line containing byte `offset`. Offsets past the end map to the last line.
    pub fn offset_to_line(&self, offset: usize) -> usize {
        self.line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1)
    }

    /// `(line, byte offset within line)` for `offset`, both 0-based.
    pub fn offset_to_line_and_byte_column(&self, offset: usize) -> (usize, usize) {
        let line = self.offset_to_line(offset);
        (line, offset - self.line_starts[line])
    }

    /// Byte range of `line`, including its terminator. `None` if the line does not exist.
    pub fn line_range(&self, line: usize) -> Option<Range<usize>> {
        let start = *self.line_starts.get(line)?;
        let end = self
            .line_starts
            .get(line + 1)
            .copied()
            .unwrap_or(self.text_len);
        Some(start..end)
    }

    /// Update the index after `range` of the old text was replaced.
    ///
    /// `new_text` is the whole text after the replacement. Only the inserted bytes (plus the byte
    /// following them) are scanned; line starts after the edit are shifted.
    ///
    /// # Panics
    ///
    /// Panics if `range` does not fit the previously indexed text.
    pub fn replace_text(&mut self, range: Range<usize>, new_text: &[u8]) {
        assert!(
            range.start <= range.end && range.end <= self.text_len,
            "edit range {range:?} outside of indexed text (length {})",
            self.text_len
        );
        let inserted_len = new_text.len() + range.len() - self.text_len;
        let inserted_end = range.start + inserted_len;

        // A position is a line start depending only on the byte before it and the byte at it, so
        // only positions `range.start..=range.end` (old) / `range.start..=inserted_end` (new) can
        // change. Position 0 always starts a line.
        let scan_start = range.start.max(1);
        let first_removed = self.line_starts.partition_point(|&s| s < scan_start);
        let first_kept = self.line_starts.partition_point(|&s| s <= range.end);

        for start in &mut self.line_starts[first_kept..] {
            *start = *start - range.end + inserted_end;
        }
        let replacement = (scan_start..=inserted_end).filter(|&p| is_line_start(new_text, p));
        self.line_starts
            .splice(first_removed..first_kept, replacement);
        self.text_len = new_text.len();
    }
}

impl Default for LineIndex {
    fn default() -> Self {
        Self::new()
    }
}

fn is_line_start(text: &[u8], position: usize) -> bool {
    if position == 0 || position > text.len() {
        return position == 0;
    }
    match text[position - 1] {
        b'\n' => true,
        b'\r' => text.get(position) != Some(&b'\n'),
        _ => false,
    }
}
