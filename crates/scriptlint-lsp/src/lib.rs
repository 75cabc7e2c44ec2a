#![warn(missing_docs)]
//! `scriptlint-lsp` - LSP integration for `scriptlint-core`.
//!
//! This crate contains LSP-specific utilities (UTF-16 coordinate conversion, JSON-RPC stdio
//! framing, a batching outgoing message queue, `Diagnostic[]` rendering) plus a small
//! [`LintingLspServer`] which lints documents as the client edits them.

pub mod error;
pub mod lsp_diag_reporter;
pub mod lsp_locator;
pub mod lsp_server;
pub mod lsp_transport;
pub mod outgoing_queue;

pub use error::LspError;
pub use lsp_diag_reporter::{
    DIAGNOSTIC_SOURCE, LspDiagReporter, LspDiagnostic, LspDiagnosticRelatedInformation,
    LspLocation, lsp_severity,
};
pub use lsp_locator::{LspDocumentText, LspLocator, LspPosition, LspRange};
pub use lsp_server::LintingLspServer;
pub use lsp_transport::{frame_header, frame_message, read_lsp_message, write_lsp_message};
pub use outgoing_queue::{LspEndpointRemote, LspWriterRemote, OutgoingJsonRpcMessageQueue};
