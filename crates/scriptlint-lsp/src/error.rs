//! Errors of the LSP transport and endpoint.

use std::io;
use thiserror::Error;

/// Failure to read, decode or write an LSP message.
#[derive(Debug, Error)]
pub enum LspError {
    /// The underlying stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A message body is not the JSON we expected.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The header block ended without a `Content-Length` header.
    #[error("missing Content-Length header")]
    MissingContentLength,

    /// The `Content-Length` header is not a number.
    #[error("invalid Content-Length header: {0:?}")]
    InvalidContentLength(String),
}
