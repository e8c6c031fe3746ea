//! Repository trait 定義
//!
//! チャットとメッセージの永続化インターフェース。
//! コア（Room / Registry）はこの trait に依存し、具体的なストアには依存しない。

use async_trait::async_trait;

use super::{
    entity::{Chat, Message},
    error::RepositoryError,
    value_object::ChatCode,
};

/// Chat ストア
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// チャットを保存
    ///
    /// 同じコードのチャットが既に存在する場合は `RepositoryError::DuplicateCode` を返す。
    async fn save(&self, chat: Chat) -> Result<(), RepositoryError>;

    /// コードでチャットを検索
    ///
    /// 見つからない場合は `RepositoryError::ChatNotFound` を返す。
    async fn find_by_code(&self, code: &ChatCode) -> Result<Chat, RepositoryError>;
}

/// Message ストア
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// メッセージを保存
    async fn save(&self, message: Message) -> Result<(), RepositoryError>;
}
