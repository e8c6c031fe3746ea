//! ドメイン層
//!
//! チャット・ユーザー・メッセージのモデルと、コアが依存する協調者
//! （ストア、ID 生成、コーデック、コネクション）のインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

pub mod codec;
pub mod connection;
pub mod entity;
pub mod error;
pub mod generator;
pub mod repository;
pub mod value_object;

pub use codec::{IncomingMessage, MessageCodec};
pub use connection::{Connection, Frame, FrameSink, FrameStream};
pub use entity::{Chat, Message, User};
pub use error::{CodecError, RepositoryError, TransportError, ValueObjectError};
pub use generator::{CodeGenerator, IdGenerator};
pub use repository::{ChatRepository, MessageRepository};
#[cfg(test)]
pub use repository::{MockChatRepository, MockMessageRepository};
pub use value_object::{ChatCode, ChatId, MessageId, Timestamp, UserId, UserName};
