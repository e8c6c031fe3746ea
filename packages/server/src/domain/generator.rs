//! Identifier and join-code generation.

/// Generates globally unique identifiers
pub trait IdGenerator: Send + Sync {
    fn new_id(&self) -> String;
}

/// Generates short human-shareable chat codes.
///
/// Codes are expected to be unique but the generator alone does not guarantee it;
/// the chat store rejects duplicates.
pub trait CodeGenerator: Send + Sync {
    fn new_code(&self) -> String;
}
