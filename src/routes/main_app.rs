//! Handlers for the main application.
//!
//! `/health` is a liveness probe: it answers as long as the process can
//! respond to HTTP, and is what the sidecar polls.

use serde::Serialize;

use super::{timestamp, PrettyJson};

pub const SERVICE_NAME: &str = "main-app";

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub service: &'static str,
    pub message: &'static str,
    pub timestamp: String,
    pub pid: u32,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: String,
}

/// Service identity.
pub async fn index() -> PrettyJson<IndexResponse> {
    PrettyJson(IndexResponse {
        service: SERVICE_NAME,
        message: "Hello from main application!",
        timestamp: timestamp(),
        pid: std::process::id(),
    })
}

/// Health check handler.
pub async fn health() -> PrettyJson<HealthResponse> {
    PrettyJson(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
        timestamp: timestamp(),
    })
}
