//! An editable source buffer which can be linted repeatedly.
//!
//! `Document` is the engine behind the web demo and editor integrations: the host pushes text,
//! configuration and locale changes, then asks for rendered diagnostics.
//!
//! ```
//! use scriptlint_core::Document;
//!
//! let mut doc = Document::new();
//! doc.set_text(b"let x;let x;");
//! let diags = doc.lint();
//! assert_eq!(diags[0].code.to_string(), "E0034");
//! assert_eq!(diags[0].message, "redeclaration of variable: x");
//! assert_eq!((diags[0].begin_offset, diags[0].end_offset), (10, 11));
//! ```

use crate::configuration::Configuration;
use crate::diag_reporter::DiagList;
use crate::diag_types::Diag;
use crate::diagnostic::{DiagnosticCode, DiagnosticSeverity};
use crate::diagnostic_formatter::DiagnosticFormatter;
use crate::line_index::LineIndex;
use crate::linter::parse_and_lint;
use crate::locator::{CliSourcePosition, ColumnUnit, position_with_index};
use crate::padded_string::{PaddedString, PaddedStringView};
use crate::span::SourceCodeSpan;
use crate::translation::Translator;
use std::io;
use std::ops::Range;
use thiserror::Error;

/// Errors from editing a [`Document`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// The edited range does not lie within the text.
    #[error("invalid range {begin}..{end} for document of length {len}")]
    InvalidRange {
        /// Start of the rejected range.
        begin: usize,
        /// End of the rejected range.
        end: usize,
        /// Length of the text.
        len: usize,
    },
}

/// One diagnostic, rendered in the document's locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintDiagnostic {
    /// The translated primary message, arguments substituted.
    pub message: String,
    /// E.g. `E0034`.
    pub code: DiagnosticCode,
    /// [`DiagnosticSeverity::Error`] or [`DiagnosticSeverity::Warning`].
    pub severity: DiagnosticSeverity,
    /// Byte offset where the primary span starts.
    pub begin_offset: usize,
    /// Byte offset just past the primary span.
    pub end_offset: usize,
}

/// Source text, configuration and locale of one linted file.
#[derive(Debug, Default)]
pub struct Document {
    text: PaddedString,
    config_text: Option<PaddedString>,
    config: Configuration,
    /// Set when `config_text` changed since `config` was loaded.
    config_stale: bool,
    locale: String,
    translator: Translator,
    /// Built on the first [`Document::position`] call and patched by edits afterwards.
    line_index: Option<LineIndex>,
    diagnostics: Vec<LintDiagnostic>,
}

impl Document {
    /// An empty document with the default configuration and untranslated messages.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current source text.
    pub fn text(&self) -> &[u8] {
        self.text.as_bytes()
    }

    /// The locale last passed to [`set_locale`](Self::set_locale); empty by default.
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Replace the whole source text.
    pub fn set_text(&mut self, text: &[u8]) {
        self.text.assign(text);
        self.line_index = None;
        self.diagnostics.clear();
    }

    /// Replace `range` of the source text with `replacement`.
    pub fn replace_text(
        &mut self,
        range: Range<usize>,
        replacement: &[u8],
    ) -> Result<(), DocumentError> {
        if range.start > range.end || range.end > self.text.len() {
            return Err(DocumentError::InvalidRange {
                begin: range.start,
                end: range.end,
                len: self.text.len(),
            });
        }
        self.text.replace_range(range.clone(), replacement);
        if let Some(line_index) = &mut self.line_index {
            line_index.replace_text(range, self.text.as_bytes());
        }
        self.diagnostics.clear();
        Ok(())
    }

    /// Replace the configuration JSON. It is parsed by the next [`lint`](Self::lint).
    pub fn set_config_text(&mut self, config_text: &[u8]) {
        self.config_text = Some(PaddedString::new(config_text));
        self.config_stale = true;
    }

    /// Translate subsequent diagnostics into `locale` (e.g. `de` or `en_US@snarky`).
    ///
    /// Unknown locales produce untranslated messages.
    pub fn set_locale(&mut self, locale: &str) {
        self.locale = locale.to_owned();
        self.translator = Translator::for_locale(locale);
    }

    /// Lint the current text.
    ///
    /// Syntax errors come first, in source order, followed by variable errors. Linting the same
    /// text with the same configuration and locale gives the same result.
    pub fn lint(&mut self) -> &[LintDiagnostic] {
        if self.config_stale {
            self.reload_config();
        }

        let input = self.text.view();
        let mut diags = DiagList::new();
        parse_and_lint(input, &mut diags, self.config.globals());
        self.diagnostics = diags
            .iter()
            .filter_map(|diag| match render(diag, input, self.translator) {
                Ok(rendered) => Some(rendered),
                Err(error) => {
                    tracing::warn!(
                        %error,
                        diag_type = diag.diag_type().name(),
                        "failed to render diagnostic"
                    );
                    None
                }
            })
            .collect();
        tracing::debug!(
            text_len = input.len(),
            diagnostics = self.diagnostics.len(),
            "linted document"
        );
        &self.diagnostics
    }

    /// The 1-based line and column (in code points) of byte `offset`.
    ///
    /// Offsets past the end of the text are clamped to it.
    pub fn position(&mut self, offset: usize) -> CliSourcePosition {
        let text = self.text.as_bytes();
        let line_index = self
            .line_index
            .get_or_insert_with(|| LineIndex::from_text(text));
        position_with_index(text, line_index, ColumnUnit::CodePoint, offset.min(text.len()))
    }

    fn reload_config(&mut self) {
        self.config_stale = false;
        let Some(config_text) = &self.config_text else {
            self.config.reset();
            return;
        };
        let mut config_diags = DiagList::new();
        self.config.load_from_json(config_text.view(), &mut config_diags);
        if !config_diags.is_empty() {
            tracing::debug!(
                diagnostics = config_diags.len(),
                "configuration has errors; invalid parts ignored"
            );
        }
    }
}

fn render(
    diag: &Diag<'_>,
    input: PaddedStringView<'_>,
    translator: Translator,
) -> io::Result<LintDiagnostic> {
    let info = diag.diag_type().info();
    let mut collector = MessageCollector {
        translator,
        message: Vec::new(),
        origin: None,
    };
    collector.format(info, diag.raw())?;
    let offsets = collector
        .origin
        .map_or(0..0, |origin| origin.offsets(input));
    Ok(LintDiagnostic {
        message: String::from_utf8_lossy(&collector.message).into_owned(),
        code: info.code_string(),
        severity: info.severity,
        begin_offset: offsets.start,
        end_offset: offsets.end,
    })
}

/// Collects the primary message of one diagnostic.
struct MessageCollector<'code> {
    translator: Translator,
    message: Vec<u8>,
    origin: Option<SourceCodeSpan<'code>>,
}

impl<'code> DiagnosticFormatter<'code> for MessageCollector<'code> {
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
        origin: SourceCodeSpan<'code>,
    ) -> io::Result<()> {
        self.origin = Some(origin);
        Ok(())
    }

    fn write_message_part(
        &mut self,
        _code: DiagnosticCode,
        _severity: DiagnosticSeverity,
        part: &[u8],
    ) -> io::Result<()> {
        self.message.extend_from_slice(part);
        Ok(())
    }

    fn write_after_message(
        &mut self,
        _code: DiagnosticCode,
        _severity: DiagnosticSeverity,
        _origin: SourceCodeSpan<'code>,
    ) -> io::Result<()> {
        Ok(())
    }
}
