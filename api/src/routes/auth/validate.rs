use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::dto::auth_dto::{ValidateTokenRequest, ValidateTokenResponse};
use crate::handlers::error_handler::{handle_token_error, handle_validation_errors};

use sp_core::repositories::TokenRepository;

use super::AppState;

/// Handler for POST /api/v1/auth/validate
///
/// Checks an access token without touching the store.
///
/// ## Success (200 OK)
/// ```json
/// {
///     "valid": true,
///     "user_id": "4f1c7a52-8d0e-4b8e-9d61-2f0f0a3b7c11"
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Empty `access_token`
/// - 401 Unauthorized: `token_invalid` or `token_expired`
pub async fn validate<T>(
    state: web::Data<AppState<T>>,
    request: web::Json<ValidateTokenRequest>,
) -> HttpResponse
where
    T: TokenRepository + 'static,
{
    if let Err(errors) = request.validate() {
        return handle_validation_errors(&errors);
    }

    match state.token_service.validate_token(&request.access_token) {
        Ok(user_id) => HttpResponse::Ok().json(ValidateTokenResponse {
            valid: true,
            user_id,
        }),
        Err(error) => handle_token_error(&error),
    }
}
