//! Batching of outgoing JSON-RPC messages.
//!
//! Handlers serialize responses and notifications into buffers owned by an
//! [`OutgoingJsonRpcMessageQueue`]; the server loop later hands every buffer, in order, to an
//! [`LspEndpointRemote`].

use crate::lsp_transport::write_lsp_message;
use std::io::{self, Write};

/// Where outgoing messages go.
pub trait LspEndpointRemote {
    /// Deliver one serialized JSON-RPC message, taking ownership of its bytes.
    fn send_message(&mut self, message: Vec<u8>) -> io::Result<()>;
}

/// Pending outgoing messages, oldest first.
#[derive(Debug, Default)]
pub struct OutgoingJsonRpcMessageQueue {
    messages: Vec<Vec<u8>>,
}

impl OutgoingJsonRpcMessageQueue {
    /// An empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new, empty message and return its buffer for the caller to fill.
    pub fn new_message(&mut self) -> &mut Vec<u8> {
        self.messages.push(Vec::new());
        let last = self.messages.len() - 1;
        &mut self.messages[last]
    }

    /// Number of queued messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Move every queued message, in FIFO order, to `remote`. The queue is empty afterwards.
    ///
    /// If `remote` fails, the failing message and everything after it are dropped and the error
    /// is returned.
    pub fn send(&mut self, remote: &mut dyn LspEndpointRemote) -> io::Result<()> {
        let count = self.messages.len();
        for message in self.messages.drain(..) {
            remote.send_message(message)?;
        }
        tracing::trace!(count, "sent queued LSP messages");
        Ok(())
    }
}

/// An [`LspEndpointRemote`] writing `Content-Length`-framed messages to a stream.
#[derive(Debug)]
pub struct LspWriterRemote<W: Write> {
    writer: W,
}

impl<W: Write> LspWriterRemote<W> {
    /// Remote writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Give back the stream.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> LspEndpointRemote for LspWriterRemote<W> {
    fn send_message(&mut self, message: Vec<u8>) -> io::Result<()> {
        write_lsp_message(&mut self.writer, &message)
    }
}

impl LspEndpointRemote for Vec<Vec<u8>> {
    fn send_message(&mut self, message: Vec<u8>) -> io::Result<()> {
        self.push(message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn messages_are_sent_in_order_and_moved() {
        let mut queue = OutgoingJsonRpcMessageQueue::new();
        queue.new_message().extend_from_slice(b"first");
        let second = queue.new_message();
        second.extend_from_slice(b"sec");
        second.extend_from_slice(b"ond");
        assert_eq!(queue.len(), 2);

        let mut remote: Vec<Vec<u8>> = Vec::new();
        queue.send(&mut remote).unwrap();
        assert_eq!(remote, [b"first".to_vec(), b"second".to_vec()]);
        assert!(queue.is_empty());

        queue.send(&mut remote).unwrap();
        assert_eq!(remote.len(), 2);
    }

    #[test]
    fn writer_remote_frames_each_message() {
        let mut queue = OutgoingJsonRpcMessageQueue::new();
        queue.new_message().extend_from_slice(b"{}");
        queue.new_message().extend_from_slice(b"[1]");

        let mut remote = LspWriterRemote::new(Vec::new());
        queue.send(&mut remote).unwrap();
        assert_eq!(
            remote.into_inner(),
            b"Content-Length: 2\r\n\r\n{}Content-Length: 3\r\n\r\n[1]"
        );
    }

    struct BrokenRemote;

    impl LspEndpointRemote for BrokenRemote {
        fn send_message(&mut self, _message: Vec<u8>) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn failed_send_still_empties_the_queue() {
        let mut queue = OutgoingJsonRpcMessageQueue::new();
        queue.new_message();
        queue.new_message();
        assert!(queue.send(&mut BrokenRemote).is_err());
        assert!(queue.is_empty());
    }
}
