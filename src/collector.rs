//! Background log collector for the sidecar.
//!
//! Rereads the whole shared log on a fixed interval and hands every
//! non-empty line to a sink. Nothing is remembered between passes, so lines
//! already seen are emitted again on every cycle.

use std::io;
use std::time::Duration;

use tokio::time::{self, Interval, MissedTickBehavior};

use crate::shared_log::SharedLog;

/// Destination for lines picked up by the collector.
pub trait LineSink: Send + Sync + 'static {
    fn emit(&self, line: &str);
}

/// Writes collected lines to the process's tracing output.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LineSink for TracingSink {
    fn emit(&self, line: &str) {
        tracing::info!(line = %line, "Processing log");
    }
}

pub struct LogCollector<S = TracingSink> {
    log: SharedLog,
    interval: Duration,
    sink: S,
}

impl LogCollector<TracingSink> {
    pub fn new(log: SharedLog, interval: Duration) -> Self {
        Self::with_sink(log, interval, TracingSink)
    }
}

impl<S: LineSink> LogCollector<S> {
    pub fn with_sink(log: SharedLog, interval: Duration, sink: S) -> Self {
        Self {
            log,
            interval,
            sink,
        }
    }

    /// Spawn the collector as an independent task.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Poll forever. Read failures are logged and the next tick proceeds.
    pub async fn run(self) {
        if let Err(e) = self.log.ensure_parent_dir().await {
            tracing::warn!(path = %self.log.path().display(), error = %e, "Failed to create log directory");
        }

        tracing::info!(
            path = %self.log.path().display(),
            interval_secs = self.interval.as_secs(),
            "Starting log collection"
        );

        let mut ticker = poll_ticker(self.interval);
        loop {
            ticker.tick().await;
            match self.poll_once().await {
                Ok(emitted) => tracing::debug!(emitted, "Collector pass complete"),
                Err(e) => {
                    tracing::warn!(path = %self.log.path().display(), error = %e, "Failed to read shared log")
                }
            }
        }
    }

    /// One full pass over the file. Returns the number of lines emitted.
    pub async fn poll_once(&self) -> io::Result<usize> {
        let lines = self.log.read_lines().await?;
        let mut emitted = 0;
        for line in lines.iter().map(|l| l.trim()).filter(|l| !l.is_empty()) {
            self.sink.emit(line);
            emitted += 1;
        }
        Ok(emitted)
    }
}

/// Ticker that waits a full period after a late pass instead of catching up.
fn poll_ticker(period: Duration) -> Interval {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}
