//! Generic, table-driven diagnostic formatting.

use crate::diagnostic::{
    DiagnosticCode, DiagnosticInfo, DiagnosticMessage, DiagnosticSeverity, RawDiag,
};
use crate::span::SourceCodeSpan;
use crate::translation::Translator;
use std::io;

/// Turns catalog rows plus payloads into output.
///
/// Implementors provide three hooks; [`format`](Self::format) walks the diagnostic's messages,
/// translates each template and expands `{N}` placeholders, calling the hooks in order:
///
/// ```text
/// write_before_message, write_message_part*, write_after_message   (primary message)
/// write_before_message, write_message_part*, write_after_message   (each note, if included)
/// ```
///
/// Notes are formatted with [`DiagnosticSeverity::Note`].
pub trait DiagnosticFormatter<'code> {
    /// The translator used for templates.
    fn translator(&self) -> Translator;

    /// Whether notes are formatted after the primary message.
    fn includes_notes(&self) -> bool {
        true
    }

    /// Called before the parts of each message.
    fn write_before_message(
        &mut self,
        code: DiagnosticCode,
        severity: DiagnosticSeverity,
        origin: SourceCodeSpan<'code>,
    ) -> io::Result<()>;

    /// Called with successive pieces of the translated, expanded message text.
    fn write_message_part(
        &mut self,
        code: DiagnosticCode,
        severity: DiagnosticSeverity,
        part: &[u8],
    ) -> io::Result<()>;

    /// Called after the parts of each message.
    fn write_after_message(
        &mut self,
        code: DiagnosticCode,
        severity: DiagnosticSeverity,
        origin: SourceCodeSpan<'code>,
    ) -> io::Result<()>;

    /// Format a whole diagnostic.
    ///
    /// # Panics
    ///
    /// Panics if an argument descriptor of `info` does not fit in `diag`'s payload.
    fn format(&mut self, info: &DiagnosticInfo, diag: RawDiag<'code>) -> io::Result<()> {
        let code = info.code_string();
        self.format_message(code, info.severity, info.primary_message(), diag)?;
        if self.includes_notes() {
            for note in info.notes() {
                self.format_message(code, DiagnosticSeverity::Note, note, diag)?;
            }
        }
        Ok(())
    }

    /// Format one message of a diagnostic.
    fn format_message(
        &mut self,
        code: DiagnosticCode,
        severity: DiagnosticSeverity,
        message: &DiagnosticMessage,
        diag: RawDiag<'code>,
    ) -> io::Result<()> {
        let origin = diag.origin_span(message);
        let template = self.translator().translate(message.format);

        self.write_before_message(code, severity, origin)?;
        let mut rest = template;
        while let Some((before, index, after)) = split_placeholder(rest) {
            if !before.is_empty() {
                self.write_message_part(code, severity, before.as_bytes())?;
            }
            match message.args.get(index) {
                Some(arg) => {
                    let value = diag.arg(arg).rendered();
                    self.write_message_part(code, severity, &value)?;
                }
                None => {
                    debug_assert!(false, "{template:?} refers to missing argument {index}");
                    let placeholder = &rest[before.len()..rest.len() - after.len()];
                    self.write_message_part(code, severity, placeholder.as_bytes())?;
                }
            }
            rest = after;
        }
        if !rest.is_empty() {
            self.write_message_part(code, severity, rest.as_bytes())?;
        }
        self.write_after_message(code, severity, origin)
    }
}

/// Split `text` at its first `{N}` placeholder into the text before it, `N`, and the text after.
fn split_placeholder(text: &str) -> Option<(&str, usize, &str)> {
    let mut search_from = 0;
    while let Some(open) = text[search_from..].find('{').map(|i| i + search_from) {
        let after_open = &text[open + 1..];
        let digits = after_open.bytes().take_while(u8::is_ascii_digit).count();
        if digits > 0 && after_open.as_bytes().get(digits) == Some(&b'}') {
            if let Ok(index) = after_open[..digits].parse::<usize>() {
                return Some((&text[..open], index, &after_open[digits + 1..]));
            }
        }
        search_from = open + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::{DiagnosticArgKind, DiagnosticMessageArgInfo};
    use crate::padded_string::PaddedString;
    use crate::translation_table::TranslatableMessage;
    use pretty_assertions::assert_eq;
    use std::mem::offset_of;

    #[derive(Default)]
    struct RecordingFormatter {
        translator: Translator,
        notes: bool,
        events: Vec<String>,
    }

    impl<'code> DiagnosticFormatter<'code> for RecordingFormatter {
        fn translator(&self) -> Translator {
            self.translator
        }

        fn includes_notes(&self) -> bool {
            self.notes
        }

        fn write_before_message(
            &mut self,
            code: DiagnosticCode,
            severity: DiagnosticSeverity,
            origin: SourceCodeSpan<'code>,
        ) -> io::Result<()> {
            self.events.push(format!(
                "before {code} {} {}",
                severity.as_str(),
                origin.to_string_lossy()
            ));
            Ok(())
        }

        fn write_message_part(
            &mut self,
            _code: DiagnosticCode,
            _severity: DiagnosticSeverity,
            part: &[u8],
        ) -> io::Result<()> {
            self.events
                .push(format!("part {}", String::from_utf8_lossy(part)));
            Ok(())
        }

        fn write_after_message(
            &mut self,
            _code: DiagnosticCode,
            _severity: DiagnosticSeverity,
            _origin: SourceCodeSpan<'code>,
        ) -> io::Result<()> {
            self.events.push("after".to_string());
            Ok(())
        }
    }

    struct TwoSpans<'code> {
        first: SourceCodeSpan<'code>,
        second: SourceCodeSpan<'code>,
    }

    static TWO_SPANS_INFO: DiagnosticInfo = DiagnosticInfo {
        code: 9999,
        severity: DiagnosticSeverity::Warning,
        messages: &[
            DiagnosticMessage {
                format: TranslatableMessage::new("{0} then {1}!"),
                args: &[
                    DiagnosticMessageArgInfo::new(
                        offset_of!(TwoSpans<'static>, first),
                        DiagnosticArgKind::SourceCodeSpan,
                    ),
                    DiagnosticMessageArgInfo::new(
                        offset_of!(TwoSpans<'static>, second),
                        DiagnosticArgKind::SourceCodeSpan,
                    ),
                ],
            },
            DiagnosticMessage {
                format: TranslatableMessage::new("here"),
                args: &[DiagnosticMessageArgInfo::new(
                    offset_of!(TwoSpans<'static>, second),
                    DiagnosticArgKind::SourceCodeSpan,
                )],
            },
        ],
        payload_size: std::mem::size_of::<TwoSpans<'static>>(),
    };

    #[test]
    fn placeholders_are_expanded_in_order() {
        let code = PaddedString::from("hello world");
        let diag = TwoSpans {
            first: SourceCodeSpan::from_range(code.view(), 0..5),
            second: SourceCodeSpan::from_range(code.view(), 6..11),
        };
        let mut formatter = RecordingFormatter {
            notes: true,
            ..Default::default()
        };
        // SAFETY: TWO_SPANS_INFO describes TwoSpans.
        let raw = unsafe { RawDiag::new(&diag) };
        formatter.format(&TWO_SPANS_INFO, raw).unwrap();

        assert_eq!(
            formatter.events,
            [
                "before E9999 warning hello",
                "part hello",
                "part  then ",
                "part world",
                "part !",
                "after",
                "before E9999 note world",
                "part here",
                "after",
            ]
        );
    }

    #[test]
    fn notes_can_be_skipped() {
        let code = PaddedString::from("hello world");
        let diag = TwoSpans {
            first: SourceCodeSpan::from_range(code.view(), 0..5),
            second: SourceCodeSpan::from_range(code.view(), 6..11),
        };
        let mut formatter = RecordingFormatter::default();
        // SAFETY: TWO_SPANS_INFO describes TwoSpans.
        let raw = unsafe { RawDiag::new(&diag) };
        formatter.format(&TWO_SPANS_INFO, raw).unwrap();
        assert_eq!(formatter.events.last().map(String::as_str), Some("after"));
        assert_eq!(formatter.events.len(), 6);
    }

    #[test]
    fn split_placeholder_skips_non_placeholders() {
        assert_eq!(split_placeholder("no args"), None);
        assert_eq!(split_placeholder("{x} {1}."), Some(("{x} ", 1, ".")));
        assert_eq!(split_placeholder("{"), None);
        assert_eq!(split_placeholder("{12}"), Some(("", 12, "")));
    }
}
