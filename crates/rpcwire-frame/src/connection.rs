use std::sync::{Mutex, MutexGuard, PoisonError};

use bytes::BytesMut;
use rpcwire_transport::Channel;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::{encode_message, FrameConfig};
use crate::error::{FrameError, Result};
use crate::message::{Incoming, RawMessage};
use crate::reader::read_message;
use crate::writer::write_frame;

/// A framed JSON-RPC connection over a duplex [`Channel`].
///
/// One lock guards the whole channel: a receive or send runs to completion
/// before the next one starts, in both directions. Calls from several threads
/// on one connection are serialized in lock order, so bytes of two messages
/// never interleave on the wire.
///
/// Use two connections over separate channel halves when reads must not wait
/// for writes.
pub struct Connection<C> {
    channel: Mutex<C>,
    config: FrameConfig,
}

impl<C: Channel> Connection<C> {
    /// Create a connection with default configuration.
    pub fn new(channel: C) -> Self {
        Self::with_config(channel, FrameConfig::default())
    }

    /// Create a connection with explicit configuration.
    pub fn with_config(channel: C, config: FrameConfig) -> Self {
        Self {
            channel: Mutex::new(channel),
            config,
        }
    }

    /// Receive one message or batch and decode it as `M`.
    ///
    /// JSON errors are returned as [`FrameError::Json`] after the body has
    /// been consumed, so the connection remains usable.
    pub fn receive<M: DeserializeOwned>(&self) -> Result<Incoming<M>> {
        let raw = self.receive_raw()?;
        Ok(raw.decode()?)
    }

    /// Receive one message with validated framing, leaving the body undecoded.
    pub fn receive_raw(&self) -> Result<RawMessage> {
        let mut channel = self.lock()?;
        read_message(&mut *channel, &self.config)
    }

    /// Serialize and send one message.
    pub fn send<M: Serialize + ?Sized>(&self, message: &M) -> Result<()> {
        let content = serde_json::to_vec(message)?;
        self.send_content(&content)
    }

    /// Serialize and send a batch as one JSON array message.
    pub fn send_batch<M: Serialize>(&self, batch: &[M]) -> Result<()> {
        self.send(batch)
    }

    /// Frame and send already serialized JSON content.
    ///
    /// # Panics
    ///
    /// Panics if `content` is empty. The check runs before the lock is taken,
    /// so the connection is not poisoned by it.
    pub fn send_content(&self, content: &[u8]) -> Result<()> {
        let mut frame = BytesMut::new();
        encode_message(content, &mut frame);

        let mut channel = self.lock()?;
        write_frame(&mut *channel, &frame)
    }

    /// Current connection configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Consume the connection and return the channel.
    pub fn into_inner(self) -> C {
        self.channel
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> Result<MutexGuard<'_, C>> {
        self.channel.lock().map_err(|_| FrameError::Poisoned)
    }
}

#[cfg(unix)]
impl Connection<rpcwire_transport::SocketChannel> {
    /// Create a connection over a socket, applying the configured timeouts.
    ///
    /// A timed out read or write surfaces as [`FrameError::Io`]; whether the
    /// stream is still aligned afterwards is up to the caller to decide.
    pub fn with_config_socket(
        stream: rpcwire_transport::SocketStream,
        config: FrameConfig,
    ) -> Result<Self> {
        stream.set_read_timeout(config.read_timeout)?;
        stream.set_write_timeout(config.write_timeout)?;
        Ok(Self::with_config(stream.into_channel()?, config))
    }
}

impl<C> std::fmt::Debug for Connection<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
