//! Hiroba chat server library.
//!
//! Real-time group chat: chats are created over HTTP and joined over WebSocket,
//! and every message a member posts is persisted, then pushed to every member of
//! the same chat.

// layers
pub mod chat;
pub mod domain;
pub mod infrastructure;
pub mod ui;
