//! Conversion logic between DTOs and domain entities.

use hiroba_shared::time::millis_to_rfc3339;

use crate::{
    chat::RoomSummary,
    domain::{Chat, IncomingMessage, Message, User},
    infrastructure::dto::{http, websocket as ws},
};

// ========================================
// DTO → Domain
// ========================================

impl From<ws::IncomingChatMessage> for IncomingMessage {
    fn from(dto: ws::IncomingChatMessage) -> Self {
        Self {
            content: dto.content,
        }
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<&User> for ws::UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.as_str().to_string(),
            name: user.name.as_str().to_string(),
        }
    }
}

impl From<&Message> for ws::ChatMessage {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.as_str().to_string(),
            content: message.content.clone(),
            chat_id: message.chat_id.as_str().to_string(),
            user: (&message.author).into(),
        }
    }
}

impl From<Chat> for http::ChatDto {
    fn from(chat: Chat) -> Self {
        Self {
            created_at: millis_to_rfc3339(chat.created_at.value()),
            id: chat.id.into_string(),
            code: chat.code.into_string(),
        }
    }
}

impl From<RoomSummary> for http::RoomSummaryDto {
    fn from(summary: RoomSummary) -> Self {
        Self {
            chat_id: summary.chat.id.into_string(),
            code: summary.chat.code.into_string(),
            members: summary.members,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChatCode, ChatId, MessageId, Timestamp, UserId, UserName};

    #[test]
    fn test_domain_message_to_dto() {
        // テスト項目: ドメインの Message が投稿者情報を含む DTO に変換される
        // given (前提条件):
        let message = Message {
            id: MessageId::new("m-1"),
            content: "hello".to_string(),
            chat_id: ChatId::new("chat-1"),
            author: User::new(UserId::new("u-1"), UserName::new("alice").unwrap()),
        };

        // when (操作):
        let dto: ws::ChatMessage = (&message).into();

        // then (期待する結果):
        assert_eq!(dto.id, "m-1");
        assert_eq!(dto.content, "hello");
        assert_eq!(dto.chat_id, "chat-1");
        assert_eq!(dto.user.id, "u-1");
        assert_eq!(dto.user.name, "alice");
    }

    #[test]
    fn test_domain_chat_to_dto() {
        // テスト項目: Chat の作成時刻が RFC 3339 文字列に変換される
        // given (前提条件):
        let chat = Chat::new(
            ChatId::new("chat-1"),
            ChatCode::new("abc123"),
            Timestamp::new(1_672_531_200_000),
        );

        // when (操作):
        let dto: http::ChatDto = chat.into();

        // then (期待する結果):
        assert_eq!(dto.id, "chat-1");
        assert_eq!(dto.code, "abc123");
        assert_eq!(dto.created_at, "2023-01-01T00:00:00.000Z");
    }
}
