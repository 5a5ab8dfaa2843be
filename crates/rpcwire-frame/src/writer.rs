use bytes::BytesMut;
use rpcwire_transport::Channel;
use tracing::debug;

use crate::codec::encode_message;
use crate::error::Result;

/// Frame `content` and write it, then flush.
///
/// # Panics
///
/// Panics if `content` is empty.
pub fn write_message<C: Channel + ?Sized>(channel: &mut C, content: &[u8]) -> Result<()> {
    let mut frame = BytesMut::new();
    encode_message(content, &mut frame);
    write_frame(channel, &frame)
}

/// Write an already encoded frame and flush the channel.
pub(crate) fn write_frame<C: Channel + ?Sized>(channel: &mut C, frame: &[u8]) -> Result<()> {
    channel.write_all(frame)?;
    channel.flush()?;
    debug!(frame_len = frame.len(), "sent message");
    Ok(())
}
