//! SQLite Repository 実装 (sqlx)
//!
//! チャットとメッセージをファイルに永続化します。
//! サーバーを再起動しても、保存済みのチャットにはコードで参加できます。

mod chat;
mod message;

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::domain::RepositoryError;

pub use chat::SqliteChatRepository;
pub use message::SqliteMessageRepository;

const SCHEMA: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS chats (
        id TEXT PRIMARY KEY NOT NULL,
        code TEXT NOT NULL UNIQUE,
        created_at INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS messages (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        id TEXT NOT NULL UNIQUE,
        chat_id TEXT NOT NULL,
        content TEXT NOT NULL,
        user_id TEXT NOT NULL,
        user_name TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS messages_chat_id ON messages (chat_id, seq)",
];

/// SQLite コネクションプール
///
/// Repository はプールを共有します。`close` はサーバー停止後に一度だけ呼びます。
#[derive(Clone)]
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    /// `path` のデータベースを開く（存在しなければ作成）
    pub async fn open(path: &Path) -> Result<Self, RepositoryError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(storage_error)?;

        let database = Self { pool };
        database.create_tables().await?;
        tracing::info!("SQLite database opened at {}", path.display());
        Ok(database)
    }

    /// プロセス内だけで使うデータベース
    ///
    /// `:memory:` はコネクションごとに別の DB になるため、コネクションを 1 本に固定する。
    pub async fn in_memory() -> Result<Self, RepositoryError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(storage_error)?;

        let database = Self { pool };
        database.create_tables().await?;
        Ok(database)
    }

    async fn create_tables(&self) -> Result<(), RepositoryError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(storage_error)?;
        }
        Ok(())
    }

    pub fn chat_repository(&self) -> SqliteChatRepository {
        SqliteChatRepository::new(self.pool.clone())
    }

    pub fn message_repository(&self) -> SqliteMessageRepository {
        SqliteMessageRepository::new(self.pool.clone())
    }

    /// プールを閉じる。実行中のクエリの完了を待つ。
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("SQLite database closed");
    }
}

fn storage_error(error: sqlx::Error) -> RepositoryError {
    RepositoryError::Storage(error.to_string())
}
