//! Request middleware.
//!
//! `request_id_layer` wraps each request in a `request` span tagged with a
//! fresh UUID v4, so every event emitted while serving it can be correlated.
//!
//! `exact_target_layer` turns any request carrying a query string into a 404;
//! routes match on the whole request target, query included.
//!
//! `access_log_layer` appends one record per handled request to the shared log.

use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::{Method, StatusCode, Version},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::Instrument;
use uuid::Uuid;

use crate::error::AppError;
use crate::shared_log::{LogRecord, SharedLog};

/// Outermost layer: opens the request span and traces status and latency
/// once the inner stack has answered.
pub async fn request_id_layer(request: Request, next: Next) -> Response {
    let span = tracing::info_span!(
        "request",
        request_id = %Uuid::new_v4(),
        method = %request.method(),
        path = %request.uri().path(),
        duration_ms = tracing::field::Empty,
    );
    let started = Instant::now();

    let response = next.run(request).instrument(span.clone()).await;

    let duration_ms = started.elapsed().as_millis() as u64;
    span.record("duration_ms", duration_ms);
    span.in_scope(|| {
        tracing::info!(status = response.status().as_u16(), "Request completed");
    });

    response
}

/// Answers 404 for any target with a query component, before routing.
///
/// `/health?x` is a different target from `/health`. Placed inside
/// `access_log_layer` so rejected requests are still recorded.
pub async fn exact_target_layer(request: Request, next: Next) -> Response {
    if request.uri().query().is_some() {
        return AppError::NotFound.into_response();
    }
    next.run(request).await
}

/// Middleware that appends an access record to the shared log.
///
/// The append finishes before the response is returned. A failed append is
/// traced and otherwise ignored; the client still gets its response.
pub async fn access_log_layer(
    State(log): State<SharedLog>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let version = request.version();
    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    let response = next.run(request).await;

    let record = LogRecord::now(access_line(&method, &target, version, response.status()));
    if let Err(e) = log.append(&record).await {
        tracing::warn!(path = %log.path().display(), error = %e, "Failed to append to shared log");
    }

    response
}

/// `"GET /health HTTP/1.1" 200 -`
fn access_line(method: &Method, target: &str, version: Version, status: StatusCode) -> String {
    format!(
        "\"{} {} {:?}\" {} -",
        method,
        target,
        version,
        status.as_u16()
    )
}
