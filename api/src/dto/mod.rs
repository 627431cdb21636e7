//! Request and response bodies of the HTTP API

pub mod auth_dto;

pub use auth_dto::{
    AuthenticateRequest, LogoutRequest, LogoutResponse, RefreshTokenRequest, TokenPairResponse,
    ValidateTokenRequest, ValidateTokenResponse,
};
