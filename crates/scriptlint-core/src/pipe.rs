//! Anonymous OS pipes.

use std::io::{PipeReader, PipeWriter};

/// The two ends of an anonymous pipe. Both ends are close-on-exec.
#[derive(Debug)]
pub struct PipeFds {
    /// Read end.
    pub reader: PipeReader,
    /// Write end.
    pub writer: PipeWriter,
}

/// Create a pipe.
///
/// Failure to create a pipe leaves the process unable to talk to its peers, so it is logged and
/// the process aborts.
pub fn make_pipe() -> PipeFds {
    match std::io::pipe() {
        Ok((reader, writer)) => PipeFds { reader, writer },
        Err(error) => {
            tracing::error!(%error, "failed to create pipe");
            std::process::abort();
        }
    }
}
