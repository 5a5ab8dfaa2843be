use std::io::ErrorKind;

/// Errors that can occur while receiving or sending framed messages.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The peer closed the stream while more bytes were expected.
    #[error("connection lost")]
    ConnectionLost,

    /// The header block is syntactically invalid.
    #[error("invalid message header: {0}")]
    MalformedHeader(String),

    /// The body was read, but its content type is not JSON-RPC.
    #[error("unsupported or invalid content type: {0}")]
    UnsupportedContentType(String),

    /// The body was read, but its charset is not UTF-8.
    #[error("unsupported or invalid character encoding: {0}")]
    UnsupportedEncoding(String),

    /// The declared body exceeds the configured maximum; the body was discarded.
    #[error("content too large ({size} bytes, max {max})")]
    ContentTooLarge { size: usize, max: usize },

    /// The body is not valid JSON for the requested message type.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Any other I/O failure on the underlying channel.
    #[error("frame I/O error: {0}")]
    Io(#[source] std::io::Error),

    /// Failed to configure the underlying transport.
    #[error("transport error: {0}")]
    Transport(#[from] rpcwire_transport::TransportError),

    /// A previous operation panicked mid-message; the stream position is unknown.
    #[error("connection poisoned by a panicked operation")]
    Poisoned,
}

impl FrameError {
    /// Whether the connection is still aligned on a message boundary.
    ///
    /// Content-type, encoding, size and JSON errors are raised only after the
    /// whole body was consumed, so the next receive starts on a fresh header.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FrameError::UnsupportedContentType(_)
                | FrameError::UnsupportedEncoding(_)
                | FrameError::ContentTooLarge { .. }
                | FrameError::Json(_)
        )
    }
}

impl From<std::io::Error> for FrameError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            ErrorKind::UnexpectedEof
            | ErrorKind::BrokenPipe
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted => FrameError::ConnectionLost,
            _ => FrameError::Io(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
