//! # Streaming Platform Auth Core
//!
//! Token lifecycle core for the streaming platform authentication service.
//! This crate contains the token entities, the signed token codec, the refresh
//! token store contract, the lifecycle orchestrator and the expiry sweeper.

pub mod clock;
pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use domain::{Claims, RefreshTokenRecord, TokenKind, TokenPair};
pub use errors::{StoreError, TokenError};
pub use repositories::{InMemoryTokenRepository, TokenRepository};
pub use services::{
    ExpirySweeper, ExpirySweeperConfig, IssuedToken, SweeperHandle, TokenCodec, TokenService,
    TokenServiceConfig,
};
