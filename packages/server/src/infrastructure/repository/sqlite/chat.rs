//! SQLite Chat Repository 実装

use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;

use crate::domain::{Chat, ChatCode, ChatId, ChatRepository, RepositoryError, Timestamp};

use super::storage_error;

/// `chats` テーブルに保存する Chat Repository
pub struct SqliteChatRepository {
    pool: SqlitePool,
}

impl SqliteChatRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChatRepository for SqliteChatRepository {
    async fn save(&self, chat: Chat) -> Result<(), RepositoryError> {
        let inserted = sqlx::query("INSERT INTO chats (id, code, created_at) VALUES (?, ?, ?)")
            .bind(chat.id.as_str())
            .bind(chat.code.as_str())
            .bind(chat.created_at.value())
            .execute(&self.pool)
            .await;

        match inserted {
            Ok(_) => {
                tracing::debug!("Chat '{}' saved with code '{}'", chat.id, chat.code);
                Ok(())
            }
            // code の UNIQUE 制約
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(RepositoryError::DuplicateCode(chat.code.into_string()))
            }
            Err(e) => Err(storage_error(e)),
        }
    }

    async fn find_by_code(&self, code: &ChatCode) -> Result<Chat, RepositoryError> {
        let row: Option<(String, String, i64)> =
            sqlx::query_as("SELECT id, code, created_at FROM chats WHERE code = ?")
                .bind(code.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(storage_error)?;

        let (id, stored_code, created_at) =
            row.ok_or_else(|| RepositoryError::ChatNotFound(code.as_str().to_string()))?;
        Ok(Chat::new(
            ChatId::new(id),
            ChatCode::new(stored_code),
            Timestamp::new(created_at),
        ))
    }
}
