//! Chat engine
//!
//! - `session`: per-connection read / write pumps with keepalive
//! - `room`: membership, ingestion and fan-out for one chat
//! - `registry`: live rooms, chat creation / join and the empty-room sweep

mod config;
mod error;
mod registry;
mod room;
mod session;

#[cfg(test)]
mod test_support;

pub use config::{RegistryConfig, SessionConfig};
pub use error::{ConfigError, CreateChatError, IngestMessageError, JoinChatError};
pub use registry::{ChatRegistry, Collaborators, RoomSummary};
pub use room::{Admission, ChatRoom, RoomDependencies};
pub use session::{ClientSession, SessionHandler, SessionPumps};
