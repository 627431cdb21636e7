//! Domain entities representing signed tokens and persisted refresh records.

pub mod token;

// Re-export commonly used types
pub use token::{Claims, RefreshTokenRecord, TokenKind, TokenPair};
