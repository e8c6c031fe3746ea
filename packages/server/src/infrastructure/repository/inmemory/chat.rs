//! InMemory Chat Repository 実装
//!
//! コード → チャットのマップを保持します。コードの重複は保存時に拒否します。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Chat, ChatCode, ChatRepository, RepositoryError};

/// インメモリ Chat Repository 実装
#[derive(Default)]
pub struct InMemoryChatRepository {
    /// Key: チャットコード
    chats: Mutex<HashMap<ChatCode, Chat>>,
}

impl InMemoryChatRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatRepository for InMemoryChatRepository {
    async fn save(&self, chat: Chat) -> Result<(), RepositoryError> {
        let mut chats = self.chats.lock().await;
        if chats.contains_key(&chat.code) {
            return Err(RepositoryError::DuplicateCode(chat.code.into_string()));
        }
        tracing::debug!("Chat '{}' saved with code '{}'", chat.id, chat.code);
        chats.insert(chat.code.clone(), chat);
        Ok(())
    }

    async fn find_by_code(&self, code: &ChatCode) -> Result<Chat, RepositoryError> {
        let chats = self.chats.lock().await;
        chats
            .get(code)
            .cloned()
            .ok_or_else(|| RepositoryError::ChatNotFound(code.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChatId, Timestamp};

    fn chat(id: &str, code: &str) -> Chat {
        Chat::new(ChatId::new(id), ChatCode::new(code), Timestamp::new(1000))
    }

    #[tokio::test]
    async fn test_save_and_find_by_code() {
        // テスト項目: 保存したチャットをコードで取得できる
        // given (前提条件):
        let repo = InMemoryChatRepository::new();
        repo.save(chat("chat-1", "abc123")).await.unwrap();

        // when (操作):
        let found = repo.find_by_code(&ChatCode::new("abc123")).await;

        // then (期待する結果):
        assert_eq!(found, Ok(chat("chat-1", "abc123")));
    }

    #[tokio::test]
    async fn test_find_unknown_code_returns_not_found() {
        // テスト項目: 存在しないコードは ChatNotFound になる
        // given (前提条件):
        let repo = InMemoryChatRepository::new();

        // when (操作):
        let result = repo.find_by_code(&ChatCode::new("nope00")).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(RepositoryError::ChatNotFound("nope00".to_string()))
        );
    }

    #[tokio::test]
    async fn test_save_duplicate_code_is_rejected() {
        // テスト項目: 同じコードのチャットは保存できず、既存のチャットは上書きされない
        // given (前提条件):
        let repo = InMemoryChatRepository::new();
        repo.save(chat("chat-1", "abc123")).await.unwrap();

        // when (操作):
        let result = repo.save(chat("chat-2", "abc123")).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(RepositoryError::DuplicateCode("abc123".to_string()))
        );
        let found = repo.find_by_code(&ChatCode::new("abc123")).await.unwrap();
        assert_eq!(found.id, ChatId::new("chat-1"));
    }
}
