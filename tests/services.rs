//! End-to-end tests for the main application and sidecar.
//!
//! Both routers are served on ephemeral loopback ports and share a log file in
//! a scratch directory, the same way the two processes share a volume.
//!
//! Run with: cargo test --test services
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use axum::Router;
use logtap::config::AppConfig;
use logtap::probe::HealthProbe;
use logtap::routes::{create_main_app_router, create_sidecar_router};
use logtap::state::{MainAppState, SidecarState};
use tokio::net::TcpListener;

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn config_for(log_path: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.shared_log.path = log_path.to_string_lossy().into_owned();
    config
}

async fn start_main_app(log_path: &Path) -> SocketAddr {
    serve(create_main_app_router(MainAppState::new(config_for(log_path)))).await
}

async fn start_sidecar(log_path: &Path, health_url: String, timeout: Duration) -> SocketAddr {
    let mut config = config_for(log_path);
    config.sidecar.main_app_health_url = health_url.clone();
    let probe = HealthProbe::new(health_url, timeout).unwrap();
    serve(create_sidecar_router(SidecarState::new(config, probe))).await
}

fn scratch_log(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("shared").join("logs").join("main-app.log")
}

async fn get_json(url: String) -> (u16, String, serde_json::Value) {
    let response = reqwest::get(url).await.unwrap();
    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get("content-type")
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default();
    let body = response.json().await.unwrap();
    (status, content_type, body)
}

#[tokio::test]
async fn valid_paths_are_json_200_and_invalid_paths_404() {
    let dir = tempfile::tempdir().unwrap();
    let log = scratch_log(&dir);
    let main_app = start_main_app(&log).await;
    let sidecar = start_sidecar(
        &log,
        format!("http://{}/health", main_app),
        Duration::from_secs(5),
    )
    .await;

    for path in ["/", "/health"] {
        let (status, content_type, _) = get_json(format!("http://{}{}", main_app, path)).await;
        assert_eq!(status, 200, "main-app {}", path);
        assert_eq!(content_type, "application/json");
    }
    for path in ["/", "/logs", "/metrics"] {
        let (status, content_type, _) = get_json(format!("http://{}{}", sidecar, path)).await;
        assert_eq!(status, 200, "sidecar {}", path);
        assert_eq!(content_type, "application/json");
    }

    let (status, _, body) = get_json(format!("http://{}/nope", main_app)).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Not found");
    let (status, _, _) = get_json(format!("http://{}/health", sidecar)).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn main_app_appends_one_line_per_request_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let log = scratch_log(&dir);
    let main_app = start_main_app(&log).await;

    let paths = ["/", "/health", "/a", "/b", "/health"];
    for path in paths {
        reqwest::get(format!("http://{}{}", main_app, path))
            .await
            .unwrap();
    }

    let contents = std::fs::read_to_string(&log).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), paths.len());
    for (line, path) in lines.iter().zip(paths) {
        assert!(
            line.contains(&format!("\"GET {} HTTP/1.1\"", path)),
            "{} should record {}",
            line,
            path
        );
    }
}

#[tokio::test]
async fn sidecar_reports_what_main_app_wrote() {
    let dir = tempfile::tempdir().unwrap();
    let log = scratch_log(&dir);
    let main_app = start_main_app(&log).await;
    let sidecar = start_sidecar(
        &log,
        format!("http://{}/health", main_app),
        Duration::from_secs(5),
    )
    .await;

    for i in 0..12 {
        reqwest::get(format!("http://{}/req-{:02}", main_app, i))
            .await
            .unwrap();
    }

    let (_, _, body) = get_json(format!("http://{}/logs", sidecar)).await;
    let logs = body["logs"].as_array().unwrap();
    assert_eq!(logs.len(), 10);
    assert!(logs[0].as_str().unwrap().contains("/req-02 "));
    assert!(logs[9].as_str().unwrap().contains("/req-11 "));

    // Lines are counted before main-app's /health is called, and that call
    // is itself logged afterwards
    let (_, _, body) = get_json(format!("http://{}/metrics", sidecar)).await;
    let total = std::fs::read_to_string(&log).unwrap().lines().count();
    assert_eq!(body["metrics"]["log_lines_processed"], 12);
    assert_eq!(total, 13);
    assert_eq!(body["metrics"]["main_app_health"], true);
    assert!(body["metrics"]["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn query_strings_are_not_found_on_both_services() {
    let dir = tempfile::tempdir().unwrap();
    let log = scratch_log(&dir);
    let main_app = start_main_app(&log).await;
    let sidecar = start_sidecar(
        &log,
        format!("http://{}/health", main_app),
        Duration::from_secs(5),
    )
    .await;

    let (status, _, body) = get_json(format!("http://{}/?x=1", main_app)).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Not found");
    let (status, _, _) = get_json(format!("http://{}/metrics?x", sidecar)).await;
    assert_eq!(status, 404);

    let contents = std::fs::read_to_string(&log).unwrap();
    assert!(contents.trim_end().ends_with("\"GET /?x=1 HTTP/1.1\" 404 -"));
}

#[tokio::test]
async fn sidecar_survives_unreachable_main_app() {
    let dir = tempfile::tempdir().unwrap();
    let log = scratch_log(&dir);

    let unused = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_url = format!("http://{}/health", unused.local_addr().unwrap());
    drop(unused);

    let timeout = Duration::from_secs(2);
    let sidecar = start_sidecar(&log, dead_url, timeout).await;

    let start = Instant::now();
    let (status, _, body) = get_json(format!("http://{}/metrics", sidecar)).await;
    assert!(start.elapsed() < timeout + Duration::from_secs(1));
    assert_eq!(status, 200);
    assert_eq!(body["metrics"]["main_app_health"], false);
    assert_eq!(body["metrics"]["log_lines_processed"], 0);

    let (status, _, _) = get_json(format!("http://{}/", sidecar)).await;
    assert_eq!(status, 200);
}
