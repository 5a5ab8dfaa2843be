//! Content-Length framed JSON-RPC transport.
//!
//! rpcwire moves JSON-RPC messages (single or batched) over any blocking
//! duplex byte stream, using the header framing language servers and their
//! clients speak over stdio and sockets.
//!
//! # Crate Structure
//!
//! - [`transport`] — Duplex channel abstraction (stdio, Unix sockets, any `BufRead` + `Write`)
//! - [`frame`] — Header/body framing, content-type validation, and the lock-guarded `Connection`

/// Re-export transport types.
pub mod transport {
    pub use rpcwire_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use rpcwire_frame::*;
}

pub use rpcwire_frame::{Connection, FrameConfig, FrameError, Incoming};
