//! InMemory Message Repository 実装

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ChatId, Message, MessageRepository, RepositoryError};

/// インメモリ Message Repository 実装
///
/// 保存順にメッセージを保持します。
#[derive(Default)]
pub struct InMemoryMessageRepository {
    messages: Mutex<Vec<Message>>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定したチャットのメッセージを保存順に取得
    pub async fn messages_for(&self, chat_id: &ChatId) -> Vec<Message> {
        let messages = self.messages.lock().await;
        messages
            .iter()
            .filter(|m| &m.chat_id == chat_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn save(&self, message: Message) -> Result<(), RepositoryError> {
        let mut messages = self.messages.lock().await;
        messages.push(message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MessageId, User, UserId, UserName};

    fn message(id: &str, chat_id: &str, content: &str) -> Message {
        Message {
            id: MessageId::new(id),
            content: content.to_string(),
            chat_id: ChatId::new(chat_id),
            author: User::new(UserId::new("u-1"), UserName::new("alice").unwrap()),
        }
    }

    #[tokio::test]
    async fn test_messages_for_filters_by_chat_and_keeps_order() {
        // テスト項目: チャットごとに保存順でメッセージが取得できる
        // given (前提条件):
        let repo = InMemoryMessageRepository::new();
        repo.save(message("m-1", "chat-a", "first")).await.unwrap();
        repo.save(message("m-2", "chat-b", "other")).await.unwrap();
        repo.save(message("m-3", "chat-a", "second")).await.unwrap();

        // when (操作):
        let messages = repo.messages_for(&ChatId::new("chat-a")).await;

        // then (期待する結果):
        let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
    }
}
