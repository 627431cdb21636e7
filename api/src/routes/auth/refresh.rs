use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::dto::auth_dto::{RefreshTokenRequest, TokenPairResponse};
use crate::handlers::error_handler::{handle_token_error, handle_validation_errors};

use sp_core::repositories::TokenRepository;

use super::AppState;

/// Handler for POST /api/v1/auth/refresh
///
/// Exchanges a refresh token for a new pair. The presented token is revoked
/// and cannot be used again.
///
/// # Request Body
///
/// ```json
/// {
///     "refresh_token": "eyJ..."
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Empty `refresh_token`
/// - 401 Unauthorized: `token_invalid`, `token_expired` or `refresh_token_revoked`
/// - 500 Internal Server Error: Store or signing failure
pub async fn refresh<T>(
    state: web::Data<AppState<T>>,
    request: web::Json<RefreshTokenRequest>,
) -> HttpResponse
where
    T: TokenRepository + 'static,
{
    if let Err(errors) = request.validate() {
        return handle_validation_errors(&errors);
    }

    match state.token_service.refresh_tokens(&request.refresh_token).await {
        Ok(pair) => HttpResponse::Ok().json(TokenPairResponse::from(pair)),
        Err(error) => handle_token_error(&error),
    }
}
