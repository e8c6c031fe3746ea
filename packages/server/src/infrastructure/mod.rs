//! Infrastructure 層
//!
//! ドメイン層が定義するインターフェースの具体的な実装を提供します。

pub mod codec;
pub mod connection;
pub mod dto;
pub mod generator;
pub mod repository;
