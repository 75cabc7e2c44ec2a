//! Compiler-style text output for terminals.
//!
//! ```text
//! hello.js:1:5: error: redeclaration of variable: x [E0034]
//! hello.js:1:1: note: variable already declared here [E0034]
//! ```

use crate::diag_reporter::DiagReporter;
use crate::diag_types::Diag;
use crate::diagnostic::{DiagnosticCode, DiagnosticSeverity};
use crate::diagnostic_formatter::DiagnosticFormatter;
use crate::locator::CliLocator;
use crate::padded_string::PaddedStringView;
use crate::span::SourceCodeSpan;
use crate::translation::Translator;
use crossterm::style::{Attribute, Color, SetAttribute, SetForegroundColor};
use std::io::{self, Write};

fn severity_color(severity: DiagnosticSeverity) -> Color {
    match severity {
        DiagnosticSeverity::Error => Color::DarkRed,
        DiagnosticSeverity::Warning => Color::DarkYellow,
        DiagnosticSeverity::Note => Color::DarkCyan,
    }
}

/// Writes each message of a diagnostic on its own line.
pub struct TextDiagFormatter<'a, 'code, W: Write> {
    translator: Translator,
    out: &'a mut W,
    locator: &'a CliLocator<'code>,
    file_path: &'a str,
    escape_errors: bool,
}

impl<'a, 'code, W: Write> TextDiagFormatter<'a, 'code, W> {
    /// Formatter writing lines prefixed with `file_path` to `out`.
    pub fn new(
        translator: Translator,
        out: &'a mut W,
        locator: &'a CliLocator<'code>,
        file_path: &'a str,
        escape_errors: bool,
    ) -> Self {
        Self {
            translator,
            out,
            locator,
            file_path,
            escape_errors,
        }
    }
}

impl<'d, W: Write> DiagnosticFormatter<'d> for TextDiagFormatter<'_, '_, W> {
    fn translator(&self) -> Translator {
        self.translator
    }

    fn write_before_message(
        &mut self,
        _code: DiagnosticCode,
        severity: DiagnosticSeverity,
        origin: SourceCodeSpan<'d>,
    ) -> io::Result<()> {
        let begin = self.locator.range(origin).begin;
        write!(
            self.out,
            "{}:{}:{}: ",
            self.file_path, begin.line_number, begin.column_number
        )?;
        if self.escape_errors {
            write!(
                self.out,
                "{}{}{}:{} ",
                SetAttribute(Attribute::Bold),
                SetForegroundColor(severity_color(severity)),
                severity.as_str(),
                SetAttribute(Attribute::Reset),
            )
        } else {
            write!(self.out, "{}: ", severity.as_str())
        }
    }

    fn write_message_part(
        &mut self,
        _code: DiagnosticCode,
        _severity: DiagnosticSeverity,
        part: &[u8],
    ) -> io::Result<()> {
        self.out.write_all(part)
    }

    fn write_after_message(
        &mut self,
        code: DiagnosticCode,
        _severity: DiagnosticSeverity,
        _origin: SourceCodeSpan<'d>,
    ) -> io::Result<()> {
        writeln!(self.out, " [{code}]")
    }
}

/// Streams text diagnostics for one file at a time.
pub struct TextDiagReporter<'code, W: Write> {
    translator: Translator,
    out: W,
    source: Option<(CliLocator<'code>, String)>,
    escape_errors: bool,
    error: Option<io::Error>,
}

impl<'code, W: Write> TextDiagReporter<'code, W> {
    /// Reporter writing to `out`.
    pub fn new(translator: Translator, out: W) -> Self {
        Self {
            translator,
            out,
            source: None,
            escape_errors: false,
            error: None,
        }
    }

    /// Color severities with terminal escape sequences.
    pub fn set_escape_errors(&mut self, escape_errors: bool) {
        self.escape_errors = escape_errors;
    }

    /// Attribute subsequent diagnostics to `input`, shown as `file_path`.
    pub fn set_source(&mut self, input: PaddedStringView<'code>, file_path: &str) {
        self.source = Some((CliLocator::new(input), file_path.to_owned()));
    }

    /// Flush `out`, returning the first write error seen.
    pub fn finish(&mut self) -> io::Result<()> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        self.out.flush()
    }

    /// Give back the output stream.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<'code, W: Write> DiagReporter<'code> for TextDiagReporter<'code, W> {
    fn report(&mut self, diag: Diag<'code>) {
        if self.error.is_some() {
            return;
        }
        let Some((locator, file_path)) = &self.source else {
            debug_assert!(false, "set_source must be called before report");
            return;
        };
        let mut formatter = TextDiagFormatter::new(
            self.translator,
            &mut self.out,
            locator,
            file_path,
            self.escape_errors,
        );
        if let Err(error) = formatter.format(diag.diag_type().info(), diag.raw()) {
            tracing::warn!(%error, "failed to write diagnostic");
            self.error = Some(error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag_types::{DiagRedeclarationOfVariable, DiagUseOfUndeclaredVariable};
    use crate::output_stream::MemoryOutputStream;
    use crate::padded_string::PaddedString;
    use pretty_assertions::assert_eq;

    #[test]
    fn messages_and_notes_are_separate_lines() {
        let input = PaddedString::from("let x;\nlet x;");
        let mut stream = MemoryOutputStream::new();
        let mut reporter = TextDiagReporter::new(Translator::new(), &mut stream);
        reporter.set_source(input.view(), "hello.js");
        reporter.report(
            DiagRedeclarationOfVariable {
                redeclaration: SourceCodeSpan::from_range(input.view(), 11..12),
                original_declaration: SourceCodeSpan::from_range(input.view(), 4..5),
            }
            .into(),
        );
        reporter.finish().unwrap();

        assert_eq!(
            stream.flushed_string(),
            "hello.js:2:5: error: redeclaration of variable: x [E0034]\n\
             hello.js:1:5: note: variable already declared here [E0034]\n"
        );
    }

    #[test]
    fn escaped_severity() {
        let input = PaddedString::from("y");
        let mut stream = MemoryOutputStream::new();
        let mut reporter = TextDiagReporter::new(Translator::new(), &mut stream);
        reporter.set_escape_errors(true);
        reporter.set_source(input.view(), "a.js");
        reporter.report(
            DiagUseOfUndeclaredVariable {
                name: SourceCodeSpan::from_range(input.view(), 0..1),
            }
            .into(),
        );
        reporter.finish().unwrap();

        assert_eq!(
            stream.flushed_string(),
            "a.js:1:1: \x1b[1m\x1b[38;5;3mwarning:\x1b[0m use of undeclared variable: y [E0057]\n"
        );
    }

    #[test]
    fn escaped_error_and_note_colors() {
        let input = PaddedString::from("let x;let x;");
        let mut stream = MemoryOutputStream::new();
        let mut reporter = TextDiagReporter::new(Translator::new(), &mut stream);
        reporter.set_escape_errors(true);
        reporter.set_source(input.view(), "a.js");
        reporter.report(
            DiagRedeclarationOfVariable {
                redeclaration: SourceCodeSpan::from_range(input.view(), 10..11),
                original_declaration: SourceCodeSpan::from_range(input.view(), 4..5),
            }
            .into(),
        );
        reporter.finish().unwrap();

        assert_eq!(
            stream.flushed_string(),
            "a.js:1:11: \x1b[1m\x1b[38;5;1merror:\x1b[0m redeclaration of variable: x [E0034]\n\
             a.js:1:5: \x1b[1m\x1b[38;5;6mnote:\x1b[0m variable already declared here [E0034]\n"
        );
    }
}
