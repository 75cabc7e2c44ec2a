//! Vim quickfix list output.
//!
//! The reporter writes one JSON document for a whole run:
//!
//! ```text
//! {"qflist":[{"col":1,"end_col":1,"end_lnum":1,"lnum":1,"nr":"E0001","type":"E",...}, ...]}
//! ```
//!
//! Vim loads it with `setqflist([], 'r', json_decode(...))`. Only primary messages become entries;
//! notes are dropped.

use crate::diag_reporter::DiagReporter;
use crate::diag_types::Diag;
use crate::diagnostic::{DiagnosticCode, DiagnosticInfo, DiagnosticSeverity};
use crate::diagnostic_formatter::DiagnosticFormatter;
use crate::padded_string::PaddedStringView;
use crate::span::SourceCodeSpan;
use crate::translation::Translator;
use crate::vim_location::{VimLocator, VimSourceRange};
use serde::Serialize;
use std::io::{self, Write};

#[derive(Serialize)]
struct QflistEntry<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    bufnr: Option<u32>,
    col: usize,
    end_col: usize,
    end_lnum: usize,
    lnum: usize,
    nr: String,
    #[serde(rename = "type")]
    entry_type: &'static str,
    text: &'a str,
    vcol: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    filename: Option<&'a str>,
}

fn entry_type(severity: DiagnosticSeverity) -> &'static str {
    match severity {
        DiagnosticSeverity::Error => "E",
        DiagnosticSeverity::Warning => "W",
        DiagnosticSeverity::Note => "I",
    }
}

/// Formats one diagnostic as one quickfix entry object.
pub struct VimQflistJsonDiagFormatter<'a, 'code, W: Write> {
    translator: Translator,
    out: &'a mut W,
    locator: &'a VimLocator<'code>,
    file_name: Option<&'a str>,
    bufnr: Option<u32>,
    range: Option<VimSourceRange>,
    text: Vec<u8>,
}

impl<'a, 'code, W: Write> VimQflistJsonDiagFormatter<'a, 'code, W> {
    /// Formatter writing entries to `out`. `file_name` and `bufnr` are included when present.
    pub fn new(
        translator: Translator,
        out: &'a mut W,
        locator: &'a VimLocator<'code>,
        file_name: Option<&'a str>,
        bufnr: Option<u32>,
    ) -> Self {
        Self {
            translator,
            out,
            locator,
            file_name,
            bufnr,
            range: None,
            text: Vec::new(),
        }
    }
}

impl<'d, W: Write> DiagnosticFormatter<'d> for VimQflistJsonDiagFormatter<'_, '_, W> {
    fn translator(&self) -> Translator {
        self.translator
    }

    fn includes_notes(&self) -> bool {
        false
    }

    fn write_before_message(
        &mut self,
        _code: DiagnosticCode,
        _severity: DiagnosticSeverity,
        origin: SourceCodeSpan<'d>,
    ) -> io::Result<()> {
        self.range = Some(self.locator.range(origin));
        self.text.clear();
        Ok(())
    }

    fn write_message_part(
        &mut self,
        _code: DiagnosticCode,
        _severity: DiagnosticSeverity,
        part: &[u8],
    ) -> io::Result<()> {
        self.text.extend_from_slice(part);
        Ok(())
    }

    fn write_after_message(
        &mut self,
        code: DiagnosticCode,
        severity: DiagnosticSeverity,
        origin: SourceCodeSpan<'d>,
    ) -> io::Result<()> {
        let range = match self.range.take() {
            Some(range) => range,
            None => self.locator.range(origin),
        };
        let text = String::from_utf8_lossy(&self.text);
        let entry = QflistEntry {
            bufnr: self.bufnr,
            col: range.begin.col,
            end_col: range.end.col,
            end_lnum: range.end.lnum,
            lnum: range.begin.lnum,
            nr: code.to_string(),
            entry_type: entry_type(severity),
            text: &text,
            vcol: 0,
            filename: self.file_name,
        };
        serde_json::to_writer(&mut *self.out, &entry)?;
        Ok(())
    }
}

/// Where the diagnostics reported next come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VimSource<'a> {
    /// Path shown by Vim; omitted from entries when `None`.
    pub file_name: Option<&'a str>,
    /// Vim buffer number; omitted from entries when `None`.
    pub bufnr: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReporterState {
    Idle,
    Active,
    Finished,
}

struct CurrentSource<'code> {
    locator: VimLocator<'code>,
    file_name: Option<String>,
    bufnr: Option<u32>,
}

/// Streams a `{"qflist":[...]}` document covering any number of source buffers.
///
/// Call [`set_source`](Self::set_source) before reporting diagnostics for each buffer, and
/// [`finish`](Self::finish) once at the end. Write errors are remembered and returned by `finish`.
pub struct VimQflistJsonDiagReporter<'code, W: Write> {
    translator: Translator,
    out: W,
    source: Option<CurrentSource<'code>>,
    state: ReporterState,
    error: Option<io::Error>,
}

impl<'code, W: Write> VimQflistJsonDiagReporter<'code, W> {
    /// Reporter writing to `out`.
    pub fn new(translator: Translator, out: W) -> Self {
        Self {
            translator,
            out,
            source: None,
            state: ReporterState::Idle,
            error: None,
        }
    }

    /// Attribute subsequent diagnostics to `input`.
    pub fn set_source(&mut self, input: PaddedStringView<'code>, source: VimSource<'_>) {
        self.source = Some(CurrentSource {
            locator: VimLocator::new(input),
            file_name: source.file_name.map(str::to_owned),
            bufnr: source.bufnr,
        });
    }

    /// Close the document and flush `out`.
    pub fn finish(&mut self) -> io::Result<()> {
        debug_assert_ne!(self.state, ReporterState::Finished, "finish called twice");
        if let Some(error) = self.error.take() {
            self.state = ReporterState::Finished;
            return Err(error);
        }
        let result = self.write_finish();
        self.state = ReporterState::Finished;
        result
    }

    /// Give back the output stream.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_finish(&mut self) -> io::Result<()> {
        if self.state == ReporterState::Idle {
            self.out.write_all(b"{\"qflist\":[")?;
        }
        self.out.write_all(b"]}\n")?;
        self.out.flush()
    }

    fn write_diag(&mut self, diag: &Diag<'code>) -> io::Result<()> {
        let Some(source) = &self.source else {
            debug_assert!(false, "set_source must be called before report");
            return Ok(());
        };
        match self.state {
            ReporterState::Idle => self.out.write_all(b"{\"qflist\":[")?,
            ReporterState::Active => self.out.write_all(b",")?,
            ReporterState::Finished => {
                debug_assert!(false, "report called after finish");
                return Ok(());
            }
        }
        self.state = ReporterState::Active;

        let info: &DiagnosticInfo = diag.diag_type().info();
        let mut formatter = VimQflistJsonDiagFormatter::new(
            self.translator,
            &mut self.out,
            &source.locator,
            source.file_name.as_deref(),
            source.bufnr,
        );
        formatter.format(info, diag.raw())
    }
}

impl<'code, W: Write> DiagReporter<'code> for VimQflistJsonDiagReporter<'code, W> {
    fn report(&mut self, diag: Diag<'code>) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.write_diag(&diag) {
            tracing::warn!(%error, "failed to write quickfix entry");
            self.error = Some(error);
        }
    }
}
