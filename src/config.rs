//! Configuration loading and constants.
//!
//! Loads configuration for both services from a single TOML file and defines
//! the defaults for ports, the shared log location, the sidecar's polling and
//! probing behaviour, and logging. `AppConfig` is the root configuration struct.

use const_format::formatcp;
use serde::Deserialize;
use std::net::Ipv6Addr;
use std::path::Path;

// =============================================================================
// HTTP Defaults
// =============================================================================

/// Default bind address for both services
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default port for the main application
pub const DEFAULT_MAIN_APP_PORT: u16 = 8080;

/// Default port for the sidecar
pub const DEFAULT_SIDECAR_PORT: u16 = 8081;

/// Every response body is a live snapshot, so nothing may be cached
pub const CACHE_CONTROL_NO_STORE: &str = "no-store";

// =============================================================================
// Shared Log
// =============================================================================

/// Location of the main application's log on the shared volume
pub const DEFAULT_SHARED_LOG_PATH: &str = "/shared/logs/main-app.log";

/// Timestamp layout written at the start of every log record
pub const LOG_RECORD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp layout used in JSON response bodies
pub const RESPONSE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

// =============================================================================
// Sidecar Collector and Probe
// =============================================================================

/// Seconds between full rereads of the shared log
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Upper bound on the loopback health probe
pub const DEFAULT_HEALTH_TIMEOUT_SECS: u64 = 5;

/// Number of trailing lines served by `/logs`
pub const DEFAULT_TAIL_LINES: usize = 10;

/// Health endpoint of the main application as seen from the sidecar
pub const DEFAULT_MAIN_APP_HEALTH_URL: &str =
    formatcp!("http://127.0.0.1:{}/health", DEFAULT_MAIN_APP_PORT);

/// User-Agent sent by the health probe
pub const HEALTH_PROBE_USER_AGENT: &str =
    formatcp!("logtap-sidecar/{}", env!("CARGO_PKG_VERSION"));

// =============================================================================
// Default Paths and Strings
// =============================================================================

/// Configuration file used when `--config` is not given, if it exists
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Default log filter when neither `--log-level` nor RUST_LOG is set
pub const DEFAULT_LOG_FILTER: &str = "logtap=debug,main_app=debug,sidecar=debug,tower_http=debug";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Main application HTTP listener
    #[serde(default)]
    pub main_app: HttpServerConfig,
    /// Sidecar listener, collector and probe settings
    #[serde(default)]
    pub sidecar: SidecarConfig,
    #[serde(default)]
    pub shared_log: SharedLogConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "HttpServerConfig::default_port")]
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: Self::default_port(),
        }
    }
}

impl HttpServerConfig {
    fn default_port() -> u16 {
        DEFAULT_MAIN_APP_PORT
    }

    /// Socket address string suitable for `TcpListener::bind`
    pub fn bind_addr(&self) -> String {
        join_host_port(&self.host, self.port)
    }
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

/// `host:port`, bracketing bare IPv6 literals such as `::`.
fn join_host_port(host: &str, port: u16) -> String {
    if host.parse::<Ipv6Addr>().is_ok() {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}

/// Sidecar configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SidecarConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "SidecarConfig::default_port")]
    pub port: u16,
    /// Seconds between collector passes over the shared log
    #[serde(default = "SidecarConfig::default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// URL probed to report `main_app_health`
    #[serde(default = "SidecarConfig::default_health_url")]
    pub main_app_health_url: String,
    /// Probe timeout in seconds
    #[serde(default = "SidecarConfig::default_health_timeout")]
    pub health_timeout_seconds: u64,
    /// Lines returned by `/logs`
    #[serde(default = "SidecarConfig::default_tail_lines")]
    pub tail_lines: usize,
}

impl Default for SidecarConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: Self::default_port(),
            poll_interval_seconds: Self::default_poll_interval(),
            main_app_health_url: Self::default_health_url(),
            health_timeout_seconds: Self::default_health_timeout(),
            tail_lines: Self::default_tail_lines(),
        }
    }
}

impl SidecarConfig {
    fn default_port() -> u16 {
        DEFAULT_SIDECAR_PORT
    }
    fn default_poll_interval() -> u64 {
        DEFAULT_POLL_INTERVAL_SECS
    }
    fn default_health_url() -> String {
        DEFAULT_MAIN_APP_HEALTH_URL.to_string()
    }
    fn default_health_timeout() -> u64 {
        DEFAULT_HEALTH_TIMEOUT_SECS
    }
    fn default_tail_lines() -> usize {
        DEFAULT_TAIL_LINES
    }

    pub fn bind_addr(&self) -> String {
        join_host_port(&self.host, self.port)
    }
}

/// Shared volume configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SharedLogConfig {
    #[serde(default = "SharedLogConfig::default_path")]
    pub path: String,
}

impl Default for SharedLogConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
        }
    }
}

impl SharedLogConfig {
    fn default_path() -> String {
        DEFAULT_SHARED_LOG_PATH.to_string()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }

    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Resolve configuration from an optional CLI path.
    ///
    /// An explicit path must exist. Without one, `DEFAULT_CONFIG_PATH` is used
    /// when present and built-in defaults otherwise.
    pub fn resolve(explicit: Option<&str>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::load(DEFAULT_CONFIG_PATH),
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.sidecar.poll_interval_seconds == 0 {
            return Err(ConfigError::Validation(
                "sidecar.poll_interval_seconds must be greater than zero".to_string(),
            ));
        }
        if self.sidecar.health_timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "sidecar.health_timeout_seconds must be greater than zero".to_string(),
            ));
        }
        if self.sidecar.tail_lines == 0 {
            return Err(ConfigError::Validation(
                "sidecar.tail_lines must be greater than zero".to_string(),
            ));
        }
        if self.shared_log.path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "shared_log.path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}
