//! HTTP surface of the auth service
//!
//! Library exports for the binary and for integration tests.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod routes;
pub mod telemetry;
