//! HTTP route handlers for both services.
//!
//! Success bodies are JSON indented with two spaces; unknown paths fall
//! through to a compact `{"error": "Not found"}` with status 404, as does any
//! target carrying a query string. Every response is marked
//! `Cache-Control: no-store` because each body is a live snapshot of process
//! or file state.
//!
//! Request tracing is enabled via middleware that generates a unique request ID
//! for each incoming request, allowing correlation of all logs within a request.

pub mod main_app;
pub mod sidecar;

use axum::{
    http::{
        header::{HeaderValue, CACHE_CONTROL, CONTENT_TYPE},
        StatusCode,
    },
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::Local;
use serde::Serialize;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::{CACHE_CONTROL_NO_STORE, RESPONSE_TIME_FORMAT};
use crate::error::AppError;
use crate::middleware::{access_log_layer, exact_target_layer, request_id_layer};
use crate::state::{MainAppState, SidecarState};

/// JSON response rendered with two-space indentation.
pub struct PrettyJson<T>(pub T);

impl<T: Serialize> IntoResponse for PrettyJson<T> {
    fn into_response(self) -> Response {
        match serde_json::to_string_pretty(&self.0) {
            Ok(body) => (
                [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize response");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// Local wall-clock time for response bodies, e.g. `2024-03-09T07:05:01.123456`.
pub fn timestamp() -> String {
    Local::now().format(RESPONSE_TIME_FORMAT).to_string()
}

/// Fallback for every unmatched path.
async fn not_found() -> AppError {
    AppError::NotFound
}

/// Creates the main application's router.
///
/// Every request that reaches the router, including unmatched ones, is
/// recorded in the shared log.
pub fn create_main_app_router(state: MainAppState) -> Router {
    let log = state.log.clone();

    Router::new()
        .route("/", get(main_app::index))
        .route("/health", get(main_app::health))
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn(exact_target_layer))
        .layer(middleware::from_fn_with_state(log, access_log_layer))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_NO_STORE),
        ))
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}

/// Creates the sidecar's router.
pub fn create_sidecar_router(state: SidecarState) -> Router {
    Router::new()
        .route("/", get(sidecar::index))
        .route("/logs", get(sidecar::logs))
        .route("/metrics", get(sidecar::metrics))
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn(exact_target_layer))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_NO_STORE),
        ))
        .layer(middleware::from_fn(request_id_layer))
}
