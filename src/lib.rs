//! logtap: a primary HTTP service and a sidecar that observes it through a
//! log file on a shared volume.
//!
//! The main application appends one line per request to the shared log. The
//! sidecar rereads that file in a background task, serves its tail and line
//! count over HTTP, and probes the main application's health endpoint.

pub mod collector;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod middleware;
pub mod probe;
pub mod routes;
pub mod shared_log;
pub mod state;

pub use error::*;
