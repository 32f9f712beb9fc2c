//! HTTP server module.
//!
//! Binds a plain HTTP listener for a router and serves it until SIGTERM or
//! SIGINT, then stops accepting connections and lets in-flight requests
//! finish.

mod server;
mod shutdown;

pub use server::{start_server, ServerError};
pub use shutdown::shutdown_signal;
