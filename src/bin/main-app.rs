//! Main application.
//!
//! Serves its identity and a health check, and appends one line per request
//! to the log file on the shared volume.

use clap::Parser;

use logtap::config::AppConfig;
use logtap::http::start_server;
use logtap::logging::{init_tracing, resolve_filter};
use logtap::routes::create_main_app_router;
use logtap::state::MainAppState;

/// Main application: identity and health endpoints with a shared access log
#[derive(Parser, Debug)]
#[command(name = "main-app", version, about)]
struct Args {
    /// Path to configuration file (defaults to config/default.toml when present)
    #[arg(short, long)]
    config: Option<String>,

    /// Log level filter (e.g., "main_app=debug,logtap=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = AppConfig::resolve(args.config.as_deref())?;
    init_tracing(&resolve_filter(args.log_level), &config.logging);

    let addr = config.main_app.bind_addr();
    tracing::info!(
        port = config.main_app.port,
        shared_log = %config.shared_log.path,
        "Main application starting"
    );

    let state = MainAppState::new(config);
    let app = create_main_app_router(state);

    start_server(app, &addr).await?;

    Ok(())
}
