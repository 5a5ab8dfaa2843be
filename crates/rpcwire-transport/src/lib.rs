//! Duplex byte-channel abstraction for JSON-RPC framing.
//!
//! The framing layer only needs four blocking primitives from a transport:
//! peek the next byte, read exactly N bytes, write bytes, flush. [`Channel`]
//! captures those, and this crate provides implementations over:
//! - any buffered reader/writer pair ([`StreamChannel`])
//! - the process's stdin/stdout ([`stdio()`])
//! - Unix domain sockets ([`UnixDomainSocket`], [`SocketStream`])
//!
//! Channels never close or reopen their streams on their own; dropping a
//! channel drops whatever it owns, and nothing more.

pub mod error;
pub mod stdio;
pub mod stream;
pub mod traits;

#[cfg(unix)]
pub mod uds;

pub use error::{Result, TransportError};
pub use stdio::{stdio, StdioChannel};
pub use stream::StreamChannel;
pub use traits::Channel;

#[cfg(unix)]
pub use uds::{SocketChannel, SocketStream, UnixDomainSocket};
