//! JSON-RPC/LSP stdio framing helpers.
//!
//! LSP messages are JSON values framed by HTTP-like headers:
//!
//! ```text
//! Content-Length: <n>\r\n
//! \r\n
//! <n bytes of UTF-8 JSON>
//! ```

use crate::error::LspError;
use std::io::{self, BufRead, Write};

/// The header block for a body of `body_len` bytes.
pub fn frame_header(body_len: usize) -> String {
    format!("Content-Length: {body_len}\r\n\r\n")
}

/// `body` with its header prepended.
pub fn frame_message(body: &[u8]) -> Vec<u8> {
    let header = frame_header(body.len());
    let mut framed = Vec::with_capacity(header.len() + body.len());
    framed.extend_from_slice(header.as_bytes());
    framed.extend_from_slice(body);
    framed
}

/// Write a single already-serialized LSP message body to `writer` and flush it.
pub fn write_lsp_message<W: Write>(writer: &mut W, body: &[u8]) -> io::Result<()> {
    writer.write_all(frame_header(body.len()).as_bytes())?;
    writer.write_all(body)?;
    writer.flush()
}

/// Read a single LSP message body from `reader`.
///
/// Returns:
/// - `Ok(Some(body))` when a message is successfully read.
/// - `Ok(None)` on clean EOF (no more messages).
pub fn read_lsp_message<R: BufRead>(reader: &mut R) -> Result<Option<Vec<u8>>, LspError> {
    let mut content_length: Option<usize> = None;
    let mut saw_header = false;
    let mut line = String::new();

    loop {
        line.clear();
        let read = reader.read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }

        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            if !saw_header {
                // Blank lines between messages.
                continue;
            }
            break;
        }
        saw_header = true;

        // Header names are case-insensitive in practice.
        if let Some((name, rest)) = trimmed.split_once(':')
            && name.trim().eq_ignore_ascii_case("Content-Length")
        {
            let value = rest.trim();
            content_length = Some(
                value
                    .parse::<usize>()
                    .map_err(|_| LspError::InvalidContentLength(value.to_owned()))?,
            );
        }
    }

    let len = content_length.ok_or(LspError::MissingContentLength)?;
    let mut body = vec![0u8; len];
    reader.read_exact(&mut body)?;
    Ok(Some(body))
}
