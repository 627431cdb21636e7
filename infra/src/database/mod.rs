//! Database module - MySQL implementations using SQLx
//!
//! This module provides:
//! - Connection pool management and schema migrations
//! - The MySQL refresh token store

pub mod connection;
pub mod mysql;

// Re-export commonly used types
pub use connection::DatabasePool;
pub use mysql::MySqlTokenRepository;
