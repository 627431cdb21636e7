//! Shared configuration and common types for the streaming platform auth service
//!
//! This crate provides functionality used across all server crates:
//! - Configuration types and the layered configuration loader
//! - The API error response structure

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, ConfigLoadError, DatabaseConfig, Environment, JwtConfig, LogFormat,
    LoggingConfig, ServerConfig, SweeperConfig,
};
pub use errors::{error_codes, ErrorResponse};
