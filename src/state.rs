//! Shared application state for request handlers.

use std::sync::Arc;
use std::time::Instant;

use crate::config::AppConfig;
use crate::probe::HealthProbe;
use crate::shared_log::SharedLog;

/// State for the main application's handlers and access-log middleware.
#[derive(Clone)]
pub struct MainAppState {
    pub config: Arc<AppConfig>,
    pub log: SharedLog,
}

impl MainAppState {
    pub fn new(config: AppConfig) -> Self {
        let log = SharedLog::new(&config.shared_log.path);
        Self {
            config: Arc::new(config),
            log,
        }
    }
}

/// State for the sidecar's handlers.
///
/// `started_at` is captured when the state is built at startup and is the
/// reference point for `uptime_seconds`. The collector task keeps its own
/// `SharedLog` and shares nothing else with the handlers.
#[derive(Clone)]
pub struct SidecarState {
    pub config: Arc<AppConfig>,
    pub log: SharedLog,
    pub probe: HealthProbe,
    pub started_at: Instant,
}

impl SidecarState {
    pub fn new(config: AppConfig, probe: HealthProbe) -> Self {
        let log = SharedLog::new(&config.shared_log.path);
        Self {
            config: Arc::new(config),
            log,
            probe,
            started_at: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
