use actix_web::{web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::dto::auth_dto::{AuthenticateRequest, TokenPairResponse};
use crate::handlers::error_handler::{
    handle_token_error, handle_validation_errors, invalid_argument,
};

use sp_core::repositories::TokenRepository;

use super::AppState;

/// Handler for POST /api/v1/auth/authenticate
///
/// Issues a fresh token pair for a user the caller has already authenticated.
///
/// # Request Body
///
/// ```json
/// {
///     "user_id": "4f1c7a52-8d0e-4b8e-9d61-2f0f0a3b7c11"
/// }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "access_token": "eyJ...",
///     "refresh_token": "eyJ...",
///     "expires_in": 900,
///     "expires_at": "2024-06-01T12:15:00Z"
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: `user_id` missing or not a UUID
/// - 500 Internal Server Error: Signing or persistence failure
pub async fn authenticate<T>(
    state: web::Data<AppState<T>>,
    request: web::Json<AuthenticateRequest>,
) -> HttpResponse
where
    T: TokenRepository + 'static,
{
    if let Err(errors) = request.validate() {
        return handle_validation_errors(&errors);
    }

    let user_id = match Uuid::parse_str(&request.user_id) {
        Ok(id) => id,
        Err(_) => return invalid_argument("user_id must be a valid UUID"),
    };

    match state.token_service.authenticate(&user_id.to_string()).await {
        Ok(pair) => HttpResponse::Ok().json(TokenPairResponse::from(pair)),
        Err(error) => handle_token_error(&error),
    }
}
