use bytes::Bytes;
use rpcwire_transport::Channel;
use tracing::{debug, warn};

use crate::codec::{validate_content_type, FrameConfig, MessageHeader};
use crate::error::{FrameError, Result};
use crate::message::RawMessage;

/// Read one complete message: header block, then exactly the declared body.
///
/// Blocks until the whole message is available. On success the channel is
/// positioned at the first byte after the body.
pub fn read_message<C: Channel + ?Sized>(
    channel: &mut C,
    config: &FrameConfig,
) -> Result<RawMessage> {
    let header = read_header(channel, config)?;
    let content = read_body(channel, &header, config)?;
    debug!(
        content_length = header.content_length,
        content_type = %header.content_type,
        "received message"
    );
    Ok(RawMessage {
        header,
        content: Bytes::from(content),
    })
}

/// Read header field lines up to and including the blank terminator line.
///
/// End of stream anywhere inside the block is [`FrameError::ConnectionLost`];
/// a `\r` starting a line that is not followed by `\n` is
/// [`FrameError::MalformedHeader`].
pub fn read_header<C: Channel + ?Sized>(
    channel: &mut C,
    config: &FrameConfig,
) -> Result<MessageHeader> {
    let mut header = MessageHeader::default();

    loop {
        match channel.peek_byte()? {
            None => return Err(FrameError::ConnectionLost),
            Some(b'\r') => break,
            Some(_) => read_field(channel, &mut header, config.max_header_line)?,
        }
    }

    channel.read_byte()?; // \r
    match channel.peek_byte()? {
        Some(b'\n') => {
            channel.read_byte()?;
            Ok(header)
        }
        Some(other) => Err(FrameError::MalformedHeader(format!(
            "expected \\n after header terminator, found {other:#04x}"
        ))),
        None => Err(FrameError::ConnectionLost),
    }
}

/// Read one field line through its `\n` and apply it to `header`.
///
/// `max_line` bounds the field text; the trailing `\r\n` is not counted.
fn read_field<C: Channel + ?Sized>(
    channel: &mut C,
    header: &mut MessageHeader,
    max_line: usize,
) -> Result<()> {
    let too_long = || FrameError::MalformedHeader(format!("header line exceeds {max_line} bytes"));

    let mut line = Vec::new();
    loop {
        match channel.read_byte()? {
            None => return Err(FrameError::ConnectionLost),
            Some(b'\n') => break,
            Some(byte) => {
                // one slot of slack for the \r
                if line.len() > max_line {
                    return Err(too_long());
                }
                line.push(byte);
            }
        }
    }
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    if line.len() > max_line {
        return Err(too_long());
    }

    let line = std::str::from_utf8(&line)
        .map_err(|_| FrameError::MalformedHeader("header line is not valid UTF-8".into()))?;
    header.apply_field(line)
}

/// Read exactly `header.content_length` bytes, then validate the content type.
///
/// Validation runs only once the body is fully consumed, so a rejected
/// message never leaves unread bytes behind. Oversized bodies are discarded
/// rather than buffered.
pub fn read_body<C: Channel + ?Sized>(
    channel: &mut C,
    header: &MessageHeader,
    config: &FrameConfig,
) -> Result<Vec<u8>> {
    let len = header.content_length;
    if len > config.max_content_length {
        warn!(
            content_length = len,
            max = config.max_content_length,
            "discarding oversized message body"
        );
        channel.discard(len)?;
        return Err(FrameError::ContentTooLarge {
            size: len,
            max: config.max_content_length,
        });
    }

    let mut body = vec![0u8; len];
    channel.read_exact(&mut body)?;

    if let Err(err) = validate_content_type(header, config.content_type_policy) {
        warn!(error = %err, "rejecting message body");
        return Err(err);
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use std::io::{self, BufReader, Cursor, ErrorKind, Read};

    use rpcwire_transport::StreamChannel;

    use super::*;
    use crate::codec::ContentTypePolicy;

    type TestChannel = StreamChannel<Cursor<Vec<u8>>, Vec<u8>>;

    fn channel(bytes: &[u8]) -> TestChannel {
        StreamChannel::new(Cursor::new(bytes.to_vec()), Vec::<u8>::new())
    }

    fn remaining(channel: TestChannel) -> Vec<u8> {
        let (mut reader, _) = channel.into_parts();
        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).unwrap();
        rest
    }

    #[test]
    fn read_literal_message() {
        let mut ch =
            channel(b"Content-Length: 2\r\nContent-Type: application/vscode-jsonrpc\r\n\r\n{}");
        let raw = read_message(&mut ch, &FrameConfig::default()).unwrap();

        assert_eq!(raw.header.content_length, 2);
        assert_eq!(raw.header.content_type, "application/vscode-jsonrpc");
        assert_eq!(raw.content.as_ref(), b"{}");
        assert!(remaining(ch).is_empty());
    }

    #[test]
    fn stops_exactly_at_body_end() {
        let mut ch = channel(b"Content-Length: 3\r\n\r\nabcContent-Length: 1\r\n\r\nz");
        let config = FrameConfig::default();

        let first = read_message(&mut ch, &config).unwrap();
        assert_eq!(first.content.as_ref(), b"abc");
        let second = read_message(&mut ch, &config).unwrap();
        assert_eq!(second.content.as_ref(), b"z");
    }

    #[test]
    fn field_order_is_irrelevant() {
        let config = FrameConfig::default();
        let mut a = channel(
            b"Content-Length: 5\r\nContent-Type: application/vscode-jsonrpc; charset=utf-8\r\n\r\n",
        );
        let mut b = channel(
            b"Content-Type: application/vscode-jsonrpc; charset=utf-8\r\nContent-Length: 5\r\n\r\n",
        );

        assert_eq!(
            read_header(&mut a, &config).unwrap(),
            read_header(&mut b, &config).unwrap()
        );
    }

    #[test]
    fn body_may_contain_control_bytes() {
        let body = b"\r\n\r\n\0\x1b\r";
        let mut wire = format!("Content-Length: {}\r\n\r\n", body.len()).into_bytes();
        wire.extend_from_slice(body);
        wire.extend_from_slice(b"trailing");

        let mut ch = channel(&wire);
        let raw = read_message(&mut ch, &FrameConfig::default()).unwrap();
        assert_eq!(raw.content.as_ref(), body);
        assert_eq!(remaining(ch), b"trailing");
    }

    #[test]
    fn declared_length_is_honored_for_many_sizes() {
        let config = FrameConfig::default();
        for len in [0usize, 1, 2, 7, 255, 4096, 70_000] {
            let mut wire = format!("Content-Length: {len}\r\n\r\n").into_bytes();
            wire.extend((0..len).map(|i| (i % 251) as u8));
            wire.push(b'#');

            let mut ch = channel(&wire);
            let raw = read_message(&mut ch, &config).unwrap();
            assert_eq!(raw.content.len(), len);
            assert_eq!(remaining(ch), b"#");
        }
    }

    #[test]
    fn missing_length_yields_empty_body() {
        let mut ch = channel(b"\r\n{}");
        let raw = read_message(&mut ch, &FrameConfig::default()).unwrap();
        assert_eq!(raw.header, MessageHeader::default());
        assert!(raw.content.is_empty());
        assert_eq!(remaining(ch), b"{}");
    }

    #[test]
    fn exhausted_stream_is_connection_lost() {
        let mut ch = channel(b"");
        let err = read_message(&mut ch, &FrameConfig::default()).unwrap_err();
        assert!(matches!(err, FrameError::ConnectionLost));
    }

    #[test]
    fn eof_mid_field_is_connection_lost() {
        let mut ch = channel(b"Content-Len");
        let err = read_header(&mut ch, &FrameConfig::default()).unwrap_err();
        assert!(matches!(err, FrameError::ConnectionLost));
    }

    #[test]
    fn eof_after_fields_is_connection_lost() {
        let mut ch = channel(b"Content-Length: 2\r\n");
        let err = read_header(&mut ch, &FrameConfig::default()).unwrap_err();
        assert!(matches!(err, FrameError::ConnectionLost));
    }

    #[test]
    fn eof_mid_body_is_connection_lost() {
        let mut ch = channel(b"Content-Length: 10\r\n\r\nshort");
        let err = read_message(&mut ch, &FrameConfig::default()).unwrap_err();
        assert!(matches!(err, FrameError::ConnectionLost));
    }

    #[test]
    fn cr_without_lf_is_malformed() {
        let mut ch = channel(b"Content-Length: 2\r\n\rX{}");
        let err = read_header(&mut ch, &FrameConfig::default()).unwrap_err();
        assert!(matches!(err, FrameError::MalformedHeader(_)));
    }

    #[test]
    fn overlong_header_line_is_malformed() {
        let config = FrameConfig {
            max_header_line: 16,
            ..FrameConfig::default()
        };
        let mut ch = channel(b"X-Padding: aaaaaaaaaaaaaaaaaaaaaaaa\r\n\r\n");
        let err = read_header(&mut ch, &config).unwrap_err();
        assert!(matches!(err, FrameError::MalformedHeader(_)));
    }

    #[test]
    fn header_line_at_limit_is_accepted() {
        let config = FrameConfig {
            max_header_line: 19,
            ..FrameConfig::default()
        };
        let mut ch = channel(b"Content-Length: 002\r\n\r\n{}");
        let raw = read_message(&mut ch, &config).unwrap();
        assert_eq!(raw.content.as_ref(), b"{}");

        let mut ch = channel(b"Content-Length: 0002\r\n\r\n{}");
        let err = read_header(&mut ch, &config).unwrap_err();
        assert!(matches!(err, FrameError::MalformedHeader(_)));
    }

    #[test]
    fn non_utf8_header_line_is_malformed() {
        let mut ch = channel(b"Content-Type: \xff\xfe\r\n\r\n");
        let err = read_header(&mut ch, &FrameConfig::default()).unwrap_err();
        assert!(matches!(err, FrameError::MalformedHeader(_)));
    }

    #[test]
    fn unknown_fields_are_skipped() {
        let mut ch = channel(b"X-Client: test\r\nContent-Length: 1\r\n\r\n1");
        let raw = read_message(&mut ch, &FrameConfig::default()).unwrap();
        assert_eq!(raw.content.as_ref(), b"1");
    }

    #[test]
    fn bad_charset_is_raised_after_body_is_drained() {
        let mut ch = channel(
            b"Content-Length: 2\r\nContent-Type: application/vscode-jsonrpc; charset=latin1\r\n\r\n{}next",
        );
        let err = read_message(&mut ch, &FrameConfig::default()).unwrap_err();

        assert!(matches!(err, FrameError::UnsupportedEncoding(ref c) if c == "latin1"));
        assert_eq!(remaining(ch), b"next");
    }

    #[test]
    fn strict_policy_rejects_missing_type_after_body() {
        let config = FrameConfig {
            content_type_policy: ContentTypePolicy::Strict,
            ..FrameConfig::default()
        };
        let mut ch = channel(b"Content-Length: 2\r\n\r\n{}next");
        let err = read_message(&mut ch, &config).unwrap_err();

        assert!(matches!(err, FrameError::UnsupportedContentType(_)));
        assert_eq!(remaining(ch), b"next");
    }

    #[test]
    fn oversized_body_is_discarded() {
        let config = FrameConfig {
            max_content_length: 4,
            ..FrameConfig::default()
        };
        let mut ch = channel(b"Content-Length: 9\r\n\r\n123456789Content-Length: 1\r\n\r\n7");

        let err = read_message(&mut ch, &config).unwrap_err();
        assert!(matches!(err, FrameError::ContentTooLarge { size: 9, max: 4 }));

        let next = read_message(&mut ch, &config).unwrap();
        assert_eq!(next.content.as_ref(), b"7");
    }

    #[test]
    fn partial_reads_are_reassembled() {
        let wire = b"Content-Length: 4\r\n\r\nslow".to_vec();
        let reader = BufReader::with_capacity(
            1,
            ByteByByteReader {
                bytes: wire,
                pos: 0,
            },
        );
        let mut ch = StreamChannel::new(reader, Vec::<u8>::new());

        let raw = read_message(&mut ch, &FrameConfig::default()).unwrap();
        assert_eq!(raw.content.as_ref(), b"slow");
    }

    #[test]
    fn io_errors_propagate() {
        let reader = BufReader::new(FailingReader);
        let mut ch = StreamChannel::new(reader, Vec::<u8>::new());
        let err = read_message(&mut ch, &FrameConfig::default()).unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::PermissionDenied));
    }

    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::from(ErrorKind::PermissionDenied))
        }
    }
}
