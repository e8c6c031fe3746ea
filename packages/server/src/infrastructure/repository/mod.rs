//! Repository 実装
//!
//! - `inmemory`: HashMap / Vec をインメモリ DB として使う実装
//! - `sqlite`: sqlx で SQLite ファイルに永続化する実装

pub mod inmemory;
pub mod sqlite;

pub use inmemory::{InMemoryChatRepository, InMemoryMessageRepository};
pub use sqlite::{SqliteChatRepository, SqliteDatabase, SqliteMessageRepository};
