//! Loopback health probe of the main application.

use std::time::Duration;

use crate::config::{SidecarConfig, HEALTH_PROBE_USER_AGENT};

/// Probes the main application's health endpoint.
///
/// Every failure mode (refused connection, timeout, non-success status)
/// collapses into `false`; the probe never returns an error to its caller.
#[derive(Clone)]
pub struct HealthProbe {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HealthProbe {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(HEALTH_PROBE_USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }

    pub fn from_config(config: &SidecarConfig) -> Result<Self, reqwest::Error> {
        Self::new(
            config.main_app_health_url.clone(),
            Duration::from_secs(config.health_timeout_seconds),
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns true iff the health endpoint answered with a 2xx status in time.
    pub async fn check(&self) -> bool {
        match self.client.get(&self.url).send().await {
            Ok(response) => {
                let success = response.status().is_success();
                if !success {
                    tracing::warn!(url = %self.url, status = %response.status(), "Health check failed: non-success status");
                }
                success
            }
            Err(e) if e.is_timeout() => {
                let timeout_ms = self.timeout.as_millis() as u64;
                tracing::warn!(url = %self.url, timeout_ms, "Health check failed: timeout");
                false
            }
            Err(e) => {
                tracing::warn!(url = %self.url, error = %e, "Health check failed: connection error");
                false
            }
        }
    }
}
