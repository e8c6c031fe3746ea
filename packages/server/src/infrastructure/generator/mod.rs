//! ID / コード生成の実装

use uuid::Uuid;

use crate::domain::{CodeGenerator, IdGenerator};

/// Length of generated chat codes
pub const CHAT_CODE_LENGTH: usize = 6;

/// UUID v4 based identifier generator
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn new_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Chat code generator using the leading hex digits of a UUID v4.
///
/// Collisions are possible; the chat store rejects duplicate codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortCodeGenerator;

impl CodeGenerator for ShortCodeGenerator {
    fn new_code(&self) -> String {
        let mut code = Uuid::new_v4().simple().to_string();
        code.truncate(CHAT_CODE_LENGTH);
        code
    }
}
