//! Handlers for the sidecar: identity, a tail of the shared log, and metrics
//! derived from the log and a probe of the main application.

use axum::extract::State;
use serde::Serialize;

use super::{timestamp, PrettyJson};
use crate::error::AppError;
use crate::state::SidecarState;

pub const SERVICE_NAME: &str = "sidecar";

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub service: &'static str,
    pub message: &'static str,
    pub timestamp: String,
    pub pid: u32,
}

#[derive(Debug, Serialize)]
pub struct LogsResponse {
    pub service: &'static str,
    pub logs: Vec<String>,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct Metrics {
    pub log_lines_processed: usize,
    pub uptime_seconds: u64,
    pub main_app_health: bool,
}

#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub service: &'static str,
    pub metrics: Metrics,
    pub timestamp: String,
}

pub async fn index() -> PrettyJson<IndexResponse> {
    PrettyJson(IndexResponse {
        service: SERVICE_NAME,
        message: "Hello from sidecar container!",
        timestamp: timestamp(),
        pid: std::process::id(),
    })
}

/// Most recent lines of the shared log, oldest first.
pub async fn logs(State(state): State<SidecarState>) -> Result<PrettyJson<LogsResponse>, AppError> {
    let logs = state.log.tail(state.config.sidecar.tail_lines).await?;

    Ok(PrettyJson(LogsResponse {
        service: SERVICE_NAME,
        logs,
        timestamp: timestamp(),
    }))
}

/// Line count, uptime and main application health, computed on every call.
pub async fn metrics(
    State(state): State<SidecarState>,
) -> Result<PrettyJson<MetricsResponse>, AppError> {
    // Count before probing: the probe itself adds a line to the main app's log
    let log_lines_processed = state.log.line_count().await?;
    let main_app_health = state.probe.check().await;

    Ok(PrettyJson(MetricsResponse {
        service: SERVICE_NAME,
        metrics: Metrics {
            log_lines_processed,
            uptime_seconds: state.uptime_seconds(),
            main_app_health,
        },
        timestamp: timestamp(),
    }))
}
