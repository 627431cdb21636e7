//! Domain layer containing the token entities.

pub mod entities;

// Re-export commonly used domain types
pub use entities::{Claims, RefreshTokenRecord, TokenKind, TokenPair};
