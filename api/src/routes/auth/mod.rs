//! Authentication route handlers
//!
//! - Issuing a token pair for an authenticated user
//! - Validating access tokens
//! - Rotating refresh tokens
//! - Logout

pub mod authenticate;
pub mod logout;
pub mod refresh;
pub mod validate;

use std::sync::Arc;

use sp_core::repositories::TokenRepository;
use sp_core::services::token::TokenService;

/// Application state that holds shared services
pub struct AppState<T>
where
    T: TokenRepository + 'static,
{
    pub token_service: Arc<TokenService<T>>,
}

impl<T> AppState<T>
where
    T: TokenRepository + 'static,
{
    pub fn new(token_service: Arc<TokenService<T>>) -> Self {
        Self { token_service }
    }
}
