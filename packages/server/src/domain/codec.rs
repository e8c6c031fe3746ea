//! Payload encoding between the wire and domain messages.

use super::{entity::Message, error::CodecError};

/// Client-supplied part of a message.
///
/// The author is injected by the session and the identifiers by the room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub content: String,
}

pub trait MessageCodec: Send + Sync {
    /// Encode a persisted message into the payload pushed to every member
    fn encode(&self, message: &Message) -> Result<String, CodecError>;

    /// Decode a raw inbound payload
    fn decode(&self, raw: &str) -> Result<IncomingMessage, CodecError>;
}
