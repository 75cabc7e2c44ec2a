//! Byte output sinks used by reporters.
//!
//! Reporters write through [`std::io::Write`]; these types add the buffering behavior the
//! reporters and their tests rely on.

use std::io::{self, BufWriter, Write};

/// In-memory stream with separate buffered and flushed regions.
///
/// Writes land in the buffered region; [`flush`](Write::flush) moves them to the flushed region.
/// Tests read what a reporter has committed with [`get_flushed_string8`](Self::get_flushed_string8).
#[derive(Debug, Clone, Default)]
pub struct MemoryOutputStream {
    buffered: Vec<u8>,
    flushed: Vec<u8>,
}

impl MemoryOutputStream {
    /// Create an empty stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes which have been flushed.
    pub fn get_flushed_string8(&self) -> &[u8] {
        &self.flushed
    }

    /// Flushed bytes as text, replacing invalid UTF-8.
    pub fn flushed_string(&self) -> String {
        String::from_utf8_lossy(&self.flushed).into_owned()
    }

    /// Bytes written since the last flush.
    pub fn buffered(&self) -> &[u8] {
        &self.buffered
    }

    /// Discard flushed and buffered bytes.
    pub fn clear(&mut self) {
        self.buffered.clear();
        self.flushed.clear();
    }
}

impl Write for MemoryOutputStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffered.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushed.append(&mut self.buffered);
        Ok(())
    }
}

/// Buffered stream over a file, pipe, or standard stream.
#[derive(Debug)]
pub struct FileOutputStream<W: Write> {
    inner: BufWriter<W>,
}

impl<W: Write> FileOutputStream<W> {
    /// Wrap `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            inner: BufWriter::new(writer),
        }
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> io::Result<W> {
        self.inner.into_inner().map_err(io::IntoInnerError::into_error)
    }
}

impl FileOutputStream<io::Stdout> {
    /// Buffered standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl FileOutputStream<io::Stderr> {
    /// Buffered standard error.
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write> Write for FileOutputStream<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flush_moves_buffered_bytes() {
        let mut stream = MemoryOutputStream::new();
        stream.write_all(b"hello").unwrap();
        assert_eq!(stream.get_flushed_string8(), b"");
        assert_eq!(stream.buffered(), b"hello");
        stream.flush().unwrap();
        stream.write_all(b" world").unwrap();
        assert_eq!(stream.get_flushed_string8(), b"hello");
        stream.flush().unwrap();
        assert_eq!(stream.flushed_string(), "hello world");
        stream.clear();
        assert_eq!(stream.get_flushed_string8(), b"");
    }

    #[test]
    fn file_stream_buffers_until_flush() {
        let mut stream = FileOutputStream::new(Vec::new());
        write!(stream, "{}-{}", 1, 2).unwrap();
        assert_eq!(stream.into_inner().unwrap(), b"1-2");
    }
}
