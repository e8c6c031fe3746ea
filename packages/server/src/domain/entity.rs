//! Entities.

use super::value_object::{ChatCode, ChatId, MessageId, Timestamp, UserId, UserName};

/// A durable, code-addressable group conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chat {
    pub id: ChatId,
    pub code: ChatCode,
    pub created_at: Timestamp,
}

impl Chat {
    pub fn new(id: ChatId, code: ChatCode, created_at: Timestamp) -> Self {
        Self {
            id,
            code,
            created_at,
        }
    }
}

/// Participant of a single client session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: UserName,
}

impl User {
    pub fn new(id: UserId, name: UserName) -> Self {
        Self { id, name }
    }
}

/// A chat message, persisted before it is broadcast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub content: String,
    pub chat_id: ChatId,
    pub author: User,
}
