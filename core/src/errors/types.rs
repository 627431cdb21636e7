//! Error kinds for the token lifecycle
//!
//! Callers of the token service only ever see [`TokenError`]. Store
//! implementations classify their driver failures into [`StoreError`] at the
//! store boundary; the service folds those into [`TokenError`].

use thiserror::Error;

/// Token lifecycle errors
///
/// A closed set that transport adapters can branch on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Malformed, unsigned, wrongly signed or unknown token
    #[error("Invalid token")]
    TokenInvalid,

    /// Well-formed token past its expiry
    #[error("Token expired")]
    TokenExpired,

    /// Refresh token already used for rotation or logged out
    #[error("Refresh token revoked")]
    TokenRevoked,

    /// Signing backend or store unavailable
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl TokenError {
    /// Creates an internal error with an opaque message
    pub fn internal(message: impl Into<String>) -> Self {
        TokenError::Internal {
            message: message.into(),
        }
    }

    /// Whether the failure was caused by the presented credential rather than the service
    pub fn is_client_error(&self) -> bool {
        !matches!(self, TokenError::Internal { .. })
    }
}

/// Refresh token store errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No record matched (absent, or no row affected by a conditional update)
    #[error("Refresh token not found")]
    NotFound,

    /// Backend failure: connection, timeout, driver or mapping error
    #[error("Store unavailable: {message}")]
    Unavailable { message: String },
}

impl StoreError {
    /// Creates an unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        StoreError::Unavailable {
            message: message.into(),
        }
    }
}
