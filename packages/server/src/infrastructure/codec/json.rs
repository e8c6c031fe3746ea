//! JSON MessageCodec

use crate::{
    domain::{CodecError, IncomingMessage, Message, MessageCodec},
    infrastructure::dto::websocket::{ChatMessage, IncomingChatMessage},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMessageCodec;

impl JsonMessageCodec {
    pub fn new() -> Self {
        Self
    }
}

impl MessageCodec for JsonMessageCodec {
    fn encode(&self, message: &Message) -> Result<String, CodecError> {
        let dto = ChatMessage::from(message);
        serde_json::to_string(&dto).map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode(&self, raw: &str) -> Result<IncomingMessage, CodecError> {
        serde_json::from_str::<IncomingChatMessage>(raw)
            .map(IncomingMessage::from)
            .map_err(|e| CodecError::Decode(e.to_string()))
    }
}
