//! Errors surfaced by the chat engine.

use std::time::Duration;

use thiserror::Error;

use crate::domain::{CodecError, RepositoryError};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CreateChatError {
    #[error("failed to store chat: {0}")]
    Store(#[from] RepositoryError),

    #[error("registry is shutting down")]
    ShuttingDown,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JoinChatError {
    #[error("chat with code '{0}' not found")]
    ChatNotFound(String),

    #[error("failed to look up chat: {0}")]
    Store(RepositoryError),

    #[error("registry is shutting down")]
    ShuttingDown,
}

impl From<RepositoryError> for JoinChatError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::ChatNotFound(code) => Self::ChatNotFound(code),
            other => Self::Store(other),
        }
    }
}

/// Failure of a message ingestion. Nothing is broadcast when this is returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IngestMessageError {
    #[error("failed to store message: {0}")]
    Store(#[from] RepositoryError),

    #[error(transparent)]
    Encode(#[from] CodecError),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("ping period {ping_period:?} must be non-zero and shorter than pong wait {pong_wait:?}")]
    InvalidPingPeriod {
        ping_period: Duration,
        pong_wait: Duration,
    },

    #[error("max message size must be greater than zero")]
    ZeroMaxMessageSize,

    #[error("mailbox capacity must be greater than zero")]
    ZeroMailboxCapacity,

    #[error("sweep interval must be greater than zero")]
    ZeroSweepInterval,
}
