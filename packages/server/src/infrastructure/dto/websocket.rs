//! WebSocket message DTOs.

use serde::{Deserialize, Serialize};

/// Message pushed to every member of a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub content: String,
    pub chat_id: String,
    pub user: UserInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
}

/// Payload sent by a client. Any other field is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IncomingChatMessage {
    pub content: String,
}
