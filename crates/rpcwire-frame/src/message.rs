use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::codec::MessageHeader;

/// A decoded message body: one message or a batch of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Incoming<M> {
    /// A single message value.
    Single(M),
    /// A batch, sent on the wire as a JSON array.
    Batch(Vec<M>),
}

impl<M> Incoming<M> {
    /// Whether the body was a batch.
    pub fn is_batch(&self) -> bool {
        matches!(self, Incoming::Batch(_))
    }

    /// Flatten into a list; a single message becomes a one-element list.
    pub fn into_vec(self) -> Vec<M> {
        match self {
            Incoming::Single(message) => vec![message],
            Incoming::Batch(batch) => batch,
        }
    }
}

/// A received message whose framing has been validated but whose body has
/// not been decoded.
#[derive(Debug, Clone)]
pub struct RawMessage {
    /// The parsed header block.
    pub header: MessageHeader,
    /// Exactly `header.content_length` body bytes.
    pub content: Bytes,
}

impl RawMessage {
    /// Decode the body as one message or a batch of messages.
    pub fn decode<M: DeserializeOwned>(&self) -> serde_json::Result<Incoming<M>> {
        decode_content(&self.content)
    }
}

/// Decode JSON content: a top-level array is a batch, anything else a single
/// message.
pub fn decode_content<M: DeserializeOwned>(content: &[u8]) -> serde_json::Result<Incoming<M>> {
    match serde_json::from_slice::<Value>(content)? {
        Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<serde_json::Result<Vec<M>>>()
            .map(Incoming::Batch),
        value => serde_json::from_value(value).map(Incoming::Single),
    }
}
