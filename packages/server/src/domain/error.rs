//! Domain errors.

use thiserror::Error;

/// Failure of a bidirectional connection. Always terminal for the session.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("connection closed")]
    Closed,

    #[error("{0} deadline exceeded")]
    Timeout(&'static str),

    #[error("message of {size} bytes exceeds the {limit} byte limit")]
    MessageTooLarge { size: usize, limit: usize },

    #[error("transport error: {0}")]
    Io(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("failed to decode payload: {0}")]
    Decode(String),

    #[error("failed to encode message: {0}")]
    Encode(String),
}

/// Store failure
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("chat with code '{0}' not found")]
    ChatNotFound(String),

    #[error("chat code '{0}' is already taken")]
    DuplicateCode(String),

    #[error("storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValueObjectError {
    #[error("user name must not be blank")]
    EmptyUserName,

    #[error("user name is {length} characters long (max {max})")]
    UserNameTooLong { length: usize, max: usize },
}
