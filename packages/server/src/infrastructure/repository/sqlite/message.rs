//! SQLite Message Repository 実装

use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;

use crate::domain::{
    ChatId, Message, MessageId, MessageRepository, RepositoryError, User, UserId, UserName,
};

use super::storage_error;

/// `messages` テーブルに保存する Message Repository
///
/// 保存順は `seq`（AUTOINCREMENT）で保持します。
pub struct SqliteMessageRepository {
    pool: SqlitePool,
}

impl SqliteMessageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 指定したチャットのメッセージを保存順に取得
    pub async fn messages_for(&self, chat_id: &ChatId) -> Result<Vec<Message>, RepositoryError> {
        let rows: Vec<(String, String, String, String)> = sqlx::query_as(
            "SELECT id, content, user_id, user_name FROM messages WHERE chat_id = ? ORDER BY seq",
        )
        .bind(chat_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        rows.into_iter()
            .map(|(id, content, user_id, user_name)| {
                let name = UserName::new(user_name)
                    .map_err(|e| RepositoryError::Storage(e.to_string()))?;
                Ok(Message {
                    id: MessageId::new(id),
                    content,
                    chat_id: chat_id.clone(),
                    author: User::new(UserId::new(user_id), name),
                })
            })
            .collect()
    }
}

#[async_trait]
impl MessageRepository for SqliteMessageRepository {
    async fn save(&self, message: Message) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO messages (id, chat_id, content, user_id, user_name) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(message.id.as_str())
        .bind(message.chat_id.as_str())
        .bind(message.content.as_str())
        .bind(message.author.id.as_str())
        .bind(message.author.name.as_str())
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;
        Ok(())
    }
}
