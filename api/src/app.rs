//! Application factory
//!
//! Builds the Actix-web application around a shared [`AppState`].

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App, HttpResponse,
};
use tracing_actix_web::TracingLogger;

use sp_core::repositories::TokenRepository;
use sp_shared::errors::{error_codes, ErrorResponse};

use crate::handlers::error_handler::json_error_handler;
use crate::routes::auth::{authenticate, logout, refresh, validate, AppState};

/// Create and configure the application with all dependencies
pub fn create_app<T>(
    app_state: web::Data<AppState<T>>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    T: TokenRepository + 'static,
{
    App::new()
        .app_data(app_state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/api/v1").service(
                web::scope("/auth")
                    .route("/authenticate", web::post().to(authenticate::authenticate::<T>))
                    .route("/validate", web::post().to(validate::validate::<T>))
                    .route("/refresh", web::post().to(refresh::refresh::<T>))
                    .route("/logout", web::post().to(logout::logout::<T>)),
            ),
        )
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "auth-service",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
