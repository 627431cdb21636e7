//! Conversion of lifecycle and request errors into HTTP responses

use actix_web::{error::JsonPayloadError, http::StatusCode, HttpRequest, HttpResponse};
use validator::ValidationErrors;

use sp_core::errors::TokenError;
use sp_shared::errors::{error_codes, ErrorResponse};

/// Map a token lifecycle error to its HTTP response
///
/// Internal failures are logged here and answered with an opaque message.
pub fn handle_token_error(error: &TokenError) -> HttpResponse {
    let (status, body) = match error {
        TokenError::TokenInvalid => (
            StatusCode::UNAUTHORIZED,
            ErrorResponse::new(error_codes::TOKEN_INVALID, "Invalid token"),
        ),
        TokenError::TokenExpired => (
            StatusCode::UNAUTHORIZED,
            ErrorResponse::new(error_codes::TOKEN_EXPIRED, "Token has expired"),
        ),
        TokenError::TokenRevoked => (
            StatusCode::UNAUTHORIZED,
            ErrorResponse::new(
                error_codes::REFRESH_TOKEN_REVOKED,
                "Refresh token has been revoked",
            ),
        ),
        TokenError::Internal { message } => {
            tracing::error!(error = %message, "Token operation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new(error_codes::INTERNAL_ERROR, "An internal error occurred"),
            )
        }
    };

    HttpResponse::build(status).json(body)
}

/// 400 response for a malformed argument
pub fn invalid_argument(message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse::new(error_codes::INVALID_ARGUMENT, message))
}

/// 400 response listing the fields that failed validation
pub fn handle_validation_errors(errors: &ValidationErrors) -> HttpResponse {
    let mut response = ErrorResponse::new(error_codes::INVALID_ARGUMENT, "Invalid request");

    for (field, field_errors) in errors.field_errors() {
        let messages: Vec<String> = field_errors
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .collect();
        response = response.add_detail(field, messages);
    }

    HttpResponse::BadRequest().json(response)
}

/// Answer undecodable JSON bodies with 400 `invalid_argument`
pub fn json_error_handler(error: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %error, "Rejected request body");
    let response = invalid_argument(format!("Malformed request body: {}", error));
    actix_web::error::InternalError::from_response(error, response).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_unauthorized() {
        for error in [
            TokenError::TokenInvalid,
            TokenError::TokenExpired,
            TokenError::TokenRevoked,
        ] {
            assert_eq!(handle_token_error(&error).status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_internal_error_maps_to_server_error() {
        let response = handle_token_error(&TokenError::internal("store unavailable"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_invalid_argument_is_bad_request() {
        assert_eq!(invalid_argument("user_id must be a UUID").status(), StatusCode::BAD_REQUEST);
    }
}
