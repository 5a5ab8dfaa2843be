use std::path::PathBuf;

/// Failures while opening or configuring a channel.
///
/// Errors on an established channel are plain [`std::io::Error`]s; the framing
/// layer decides which of them mean the peer went away.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The listening socket could not be created at `path`.
    #[error("cannot listen on {path}: {source}")]
    Bind {
        path: PathBuf,
        source: std::io::Error,
    },

    /// No server accepted a connection at `path`.
    #[error("cannot reach server at {path}: {source}")]
    Connect {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The listener failed while waiting for a client.
    #[error("accepting client failed: {0}")]
    Accept(std::io::Error),

    /// Cloning a socket or setting its options failed.
    #[error("channel setup failed: {0}")]
    Io(#[from] std::io::Error),

    /// The socket path does not fit in `sockaddr_un`.
    #[error("socket path is {len} bytes, limit is {max}: {path}")]
    PathTooLong {
        path: PathBuf,
        len: usize,
        max: usize,
    },
}

pub type Result<T> = std::result::Result<T, TransportError>;
