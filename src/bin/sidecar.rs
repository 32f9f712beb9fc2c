//! Sidecar.
//!
//! Tails the main application's log from the shared volume in a background
//! task and serves the log tail, a line count and the main application's
//! health over HTTP.

use std::time::Duration;

use clap::Parser;

use logtap::collector::LogCollector;
use logtap::config::AppConfig;
use logtap::http::start_server;
use logtap::logging::{init_tracing, resolve_filter};
use logtap::probe::HealthProbe;
use logtap::routes::create_sidecar_router;
use logtap::shared_log::SharedLog;
use logtap::state::SidecarState;

/// Sidecar: collects the main application's log and reports on it
#[derive(Parser, Debug)]
#[command(name = "sidecar", version, about)]
struct Args {
    /// Path to configuration file (defaults to config/default.toml when present)
    #[arg(short, long)]
    config: Option<String>,

    /// Log level filter (e.g., "sidecar=debug,logtap=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = AppConfig::resolve(args.config.as_deref())?;
    init_tracing(&resolve_filter(args.log_level), &config.logging);

    // Start time for uptime is taken here, before the collector or listener
    let probe = HealthProbe::from_config(&config.sidecar)?;
    let state = SidecarState::new(config.clone(), probe);

    // The collector owns its own handle to the file and shares nothing else
    LogCollector::new(
        SharedLog::new(&config.shared_log.path),
        Duration::from_secs(config.sidecar.poll_interval_seconds),
    )
    .spawn();

    let addr = config.sidecar.bind_addr();
    tracing::info!(
        port = config.sidecar.port,
        shared_log = %config.shared_log.path,
        main_app_health_url = %config.sidecar.main_app_health_url,
        endpoints = ?["/", "/logs", "/metrics"],
        "Sidecar starting"
    );

    let app = create_sidecar_router(state);
    start_server(app, &addr).await?;

    Ok(())
}
