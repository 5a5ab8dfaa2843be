use std::time::Duration;

use bytes::{BufMut, BytesMut};
use tracing::trace;

use crate::error::{FrameError, Result};

/// Header field carrying the body's byte count.
pub const CONTENT_LENGTH: &str = "Content-Length";

/// Header field carrying the body's media type.
pub const CONTENT_TYPE: &str = "Content-Type";

/// Media type every accepted body must declare.
pub const MEDIA_TYPE: &str = "application/vscode-jsonrpc";

/// Default maximum body size: 16 MiB.
pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 16 * 1024 * 1024;

/// Default maximum length of a single header field line: 8 KiB.
pub const DEFAULT_MAX_HEADER_LINE: usize = 8 * 1024;

const CHARSET_KEY: &str = "charset=";

/// Upper bound on the encoded header: field name, separator, 20 digits, two CRLFs.
const MAX_ENCODED_HEADER: usize = CONTENT_LENGTH.len() + 2 + 20 + 4;

/// Metadata parsed from a message's header block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageHeader {
    /// Number of body bytes following the header. Zero if never supplied.
    pub content_length: usize,
    /// Declared media type. Empty if never supplied.
    pub content_type: String,
}

impl MessageHeader {
    /// Apply one `Key: Value` field line (without its line break).
    ///
    /// Recognized keys overwrite the current value; anything else, including
    /// lines without a colon, is ignored.
    pub fn apply_field(&mut self, line: &str) -> Result<()> {
        let Some((key, value)) = line.split_once(':') else {
            trace!(line, "ignoring header line without separator");
            return Ok(());
        };
        let key = key.trim();
        let value = value.trim();

        if key.eq_ignore_ascii_case(CONTENT_LENGTH) {
            self.content_length = parse_content_length(value)?;
        } else if key.eq_ignore_ascii_case(CONTENT_TYPE) {
            self.content_type = value.to_string();
        } else {
            trace!(key, "ignoring unrecognized header field");
        }
        Ok(())
    }
}

/// Parse a plain decimal byte count. Signs and other prefixes are rejected.
fn parse_content_length(value: &str) -> Result<usize> {
    let invalid = || FrameError::MalformedHeader(format!("invalid {CONTENT_LENGTH}: {value:?}"));
    if !value.bytes().next().is_some_and(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    value.parse().map_err(|_| invalid())
}

/// What to do with a message that carries no `Content-Type` field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentTypePolicy {
    /// Reject it, as an empty type never starts with [`MEDIA_TYPE`].
    Strict,
    /// Treat it as [`MEDIA_TYPE`] with the default UTF-8 charset.
    #[default]
    AllowMissing,
}

/// Configuration for a framed connection.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum body size in bytes. Default: 16 MiB.
    pub max_content_length: usize,
    /// Maximum length of one header field line, excluding its `\r\n`. Default: 8 KiB.
    pub max_header_line: usize,
    /// Handling of an absent `Content-Type`. Default: allow.
    pub content_type_policy: ContentTypePolicy,
    /// Read timeout applied to socket channels.
    pub read_timeout: Option<Duration>,
    /// Write timeout applied to socket channels.
    pub write_timeout: Option<Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
            max_header_line: DEFAULT_MAX_HEADER_LINE,
            content_type_policy: ContentTypePolicy::default(),
            read_timeout: None,
            write_timeout: None,
        }
    }
}

/// Check a received header's content type.
///
/// The type must start with [`MEDIA_TYPE`]. A `charset=` parameter, if
/// present, must name UTF-8 (`utf-8` or `utf8`). Parameter name and value
/// are both matched in any case.
pub fn validate_content_type(header: &MessageHeader, policy: ContentTypePolicy) -> Result<()> {
    let content_type = header.content_type.as_str();
    if content_type.is_empty() && policy == ContentTypePolicy::AllowMissing {
        return Ok(());
    }

    if !content_type.starts_with(MEDIA_TYPE) {
        return Err(FrameError::UnsupportedContentType(content_type.to_string()));
    }

    if let Some(idx) = find_ignore_ascii_case(content_type, CHARSET_KEY) {
        let rest = &content_type[idx + CHARSET_KEY.len()..];
        let charset = rest
            .split_once(';')
            .map_or(rest, |(value, _)| value)
            .trim()
            .trim_matches('"');

        if !charset.eq_ignore_ascii_case("utf-8") && !charset.eq_ignore_ascii_case("utf8") {
            return Err(FrameError::UnsupportedEncoding(charset.to_string()));
        }
    }

    Ok(())
}

fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}

/// Encode a complete message (header block plus body) into `dst`.
///
/// Wire format:
/// ```text
/// Content-Length: <len>\r\n
/// \r\n
/// <len bytes of content>
/// ```
///
/// # Panics
///
/// Panics if `content` is empty. Serialized JSON is never empty, so an empty
/// body means the caller is broken, not the peer.
pub fn encode_message(content: &[u8], dst: &mut BytesMut) {
    assert!(!content.is_empty(), "message content must not be empty");

    dst.reserve(MAX_ENCODED_HEADER + content.len());
    dst.put_slice(CONTENT_LENGTH.as_bytes());
    dst.put_slice(b": ");
    dst.put_slice(content.len().to_string().as_bytes());
    dst.put_slice(b"\r\n\r\n");
    dst.put_slice(content);
}
