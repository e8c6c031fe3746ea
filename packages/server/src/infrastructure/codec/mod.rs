//! MessageCodec 実装
//!
//! - `json`: serde_json による実装

pub mod json;

pub use json::JsonMessageCodec;
