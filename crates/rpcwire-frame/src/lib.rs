//! Content-Length message framing for JSON-RPC over byte streams.
//!
//! Every message on the wire is a header block followed by a body:
//! - `Key: Value\r\n` field lines, of which `Content-Length` and
//!   `Content-Type` are understood
//! - a blank `\r\n` line closing the block
//! - exactly `Content-Length` bytes of UTF-8 JSON, one message or an array
//!   (batch) of messages
//!
//! [`Connection`] reads and writes whole messages under a single lock, so
//! concurrent callers never see or produce a partial message.

pub mod codec;
pub mod connection;
pub mod error;
pub mod message;
pub mod reader;
pub mod writer;

pub use codec::{
    encode_message, validate_content_type, ContentTypePolicy, FrameConfig, MessageHeader,
    CONTENT_LENGTH, CONTENT_TYPE, DEFAULT_MAX_CONTENT_LENGTH, DEFAULT_MAX_HEADER_LINE, MEDIA_TYPE,
};
pub use connection::Connection;
pub use error::{FrameError, Result};
pub use message::{decode_content, Incoming, RawMessage};
pub use reader::{read_body, read_header, read_message};
pub use writer::write_message;
