//! Token service module for JWT management
//!
//! This module handles all token-related operations including:
//! - Signing and verifying access and refresh tokens
//! - Issuing, rotating and revoking credential pairs
//! - Background deletion of expired refresh token records

mod codec;
mod config;
mod service;
mod sweeper;

#[cfg(test)]
mod tests;

pub use codec::{IssuedToken, TokenCodec};
pub use config::{ExpirySweeperConfig, TokenServiceConfig};
pub use service::TokenService;
pub use sweeper::{ExpirySweeper, SweeperHandle};
