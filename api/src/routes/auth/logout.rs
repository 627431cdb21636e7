use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::dto::auth_dto::{LogoutRequest, LogoutResponse};
use crate::handlers::error_handler::{handle_token_error, handle_validation_errors};

use sp_core::repositories::TokenRepository;

use super::AppState;

/// Handler for POST /api/v1/auth/logout
///
/// Revokes the presented refresh token. Repeating the call for an already
/// revoked token succeeds.
///
/// ## Success (200 OK)
/// ```json
/// {
///     "success": true
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Empty `refresh_token`
/// - 401 Unauthorized: Token was never issued
/// - 500 Internal Server Error: Store failure
pub async fn logout<T>(
    state: web::Data<AppState<T>>,
    request: web::Json<LogoutRequest>,
) -> HttpResponse
where
    T: TokenRepository + 'static,
{
    if let Err(errors) = request.validate() {
        return handle_validation_errors(&errors);
    }

    match state.token_service.logout(&request.refresh_token).await {
        Ok(()) => HttpResponse::Ok().json(LogoutResponse { success: true }),
        Err(error) => handle_token_error(&error),
    }
}
