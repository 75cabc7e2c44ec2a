//! Diagnostics in the shape of LSP's `Diagnostic[]`.

use crate::error::LspError;
use crate::lsp_locator::{LspLocator, LspRange};
use scriptlint_core::{
    Diag, DiagReporter, DiagnosticCode, DiagnosticFormatter, DiagnosticSeverity, SourceCodeSpan,
    Translator,
};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// `source` of every diagnostic we publish.
pub const DIAGNOSTIC_SOURCE: &str = "scriptlint";

/// LSP `DiagnosticSeverity`.
pub fn lsp_severity(severity: DiagnosticSeverity) -> u8 {
    match severity {
        DiagnosticSeverity::Error => 1,
        DiagnosticSeverity::Warning => 2,
        DiagnosticSeverity::Note => 3,
    }
}

/// LSP `Location`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LspLocation {
    /// Document URI.
    pub uri: String,
    /// Range within the document.
    pub range: LspRange,
}

/// LSP `DiagnosticRelatedInformation`; carries a note of a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LspDiagnosticRelatedInformation {
    /// Where the note points.
    pub location: LspLocation,
    /// The note's text.
    pub message: String,
}

/// LSP `Diagnostic`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LspDiagnostic {
    /// Range of the primary span.
    pub range: LspRange,
    /// 1 for errors, 2 for warnings.
    pub severity: u8,
    /// E.g. `E0034`.
    pub code: String,
    /// Always [`DIAGNOSTIC_SOURCE`].
    pub source: String,
    /// Translated primary message.
    pub message: String,
    /// Notes; only filled when the reporter knows the document URI.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_information: Vec<LspDiagnosticRelatedInformation>,
}

struct FormattedMessage {
    severity: DiagnosticSeverity,
    range: LspRange,
    text: Vec<u8>,
}

/// Collects the messages of one diagnostic with their LSP ranges.
struct LspDiagFormatter<'a, 'code> {
    translator: Translator,
    locator: &'a LspLocator<'code>,
    messages: Vec<FormattedMessage>,
}

impl<'d> DiagnosticFormatter<'d> for LspDiagFormatter<'_, '_> {
    fn translator(&self) -> Translator {
        self.translator
    }

    fn write_before_message(
        &mut self,
        _code: DiagnosticCode,
        severity: DiagnosticSeverity,
        origin: SourceCodeSpan<'d>,
    ) -> io::Result<()> {
        self.messages.push(FormattedMessage {
            severity,
            range: self.locator.range(origin),
            text: Vec::new(),
        });
        Ok(())
    }

    fn write_message_part(
        &mut self,
        _code: DiagnosticCode,
        _severity: DiagnosticSeverity,
        part: &[u8],
    ) -> io::Result<()> {
        if let Some(message) = self.messages.last_mut() {
            message.text.extend_from_slice(part);
        }
        Ok(())
    }

    fn write_after_message(
        &mut self,
        _code: DiagnosticCode,
        _severity: DiagnosticSeverity,
        _origin: SourceCodeSpan<'d>,
    ) -> io::Result<()> {
        Ok(())
    }
}

/// Builds the `diagnostics` array of a `textDocument/publishDiagnostics` notification.
pub struct LspDiagReporter<'code> {
    translator: Translator,
    locator: LspLocator<'code>,
    uri: Option<String>,
    diagnostics: Vec<LspDiagnostic>,
}

impl<'code> LspDiagReporter<'code> {
    /// Reporter for diagnostics in the document `locator` covers.
    ///
    /// Notes become `relatedInformation` only if `uri` is given.
    pub fn new(translator: Translator, locator: LspLocator<'code>, uri: Option<&str>) -> Self {
        Self {
            translator,
            locator,
            uri: uri.map(str::to_owned),
            diagnostics: Vec::new(),
        }
    }

    /// Diagnostics reported so far.
    pub fn diagnostics(&self) -> &[LspDiagnostic] {
        &self.diagnostics
    }

    /// Stop reporting and take the diagnostics.
    pub fn finish(self) -> Vec<LspDiagnostic> {
        self.diagnostics
    }

    /// Write the diagnostics as a JSON array.
    pub fn write_json<W: Write>(&self, out: &mut W) -> Result<(), LspError> {
        serde_json::to_writer(out, &self.diagnostics)?;
        Ok(())
    }
}

impl<'code> DiagReporter<'code> for LspDiagReporter<'code> {
    fn report(&mut self, diag: Diag<'code>) {
        let info = diag.diag_type().info();
        let mut formatter = LspDiagFormatter {
            translator: self.translator,
            locator: &self.locator,
            messages: Vec::new(),
        };
        if let Err(error) = formatter.format(info, diag.raw()) {
            tracing::warn!(%error, "failed to format diagnostic");
            return;
        }

        let mut messages = formatter.messages.into_iter();
        let Some(primary) = messages.next() else {
            return;
        };
        let related_information = match &self.uri {
            Some(uri) => messages
                .map(|note| LspDiagnosticRelatedInformation {
                    location: LspLocation {
                        uri: uri.clone(),
                        range: note.range,
                    },
                    message: String::from_utf8_lossy(&note.text).into_owned(),
                })
                .collect(),
            None => Vec::new(),
        };
        self.diagnostics.push(LspDiagnostic {
            range: primary.range,
            severity: lsp_severity(primary.severity),
            code: info.code_string().to_string(),
            source: DIAGNOSTIC_SOURCE.to_owned(),
            message: String::from_utf8_lossy(&primary.text).into_owned(),
            related_information,
        });
    }
}
