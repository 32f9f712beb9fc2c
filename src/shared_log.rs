//! Append-only log file on the shared volume.
//!
//! The main application appends one record per request and the sidecar
//! rereads the whole file. Every operation opens the file, does its work and
//! closes it again; no handle outlives a call. Appends assume a single writer.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tokio::io::AsyncWriteExt;

use crate::config::LOG_RECORD_TIME_FORMAT;

/// A single timestamped line of the shared log.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp: DateTime<Local>,
    pub message: String,
}

impl LogRecord {
    pub fn now(message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            message: message.into(),
        }
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}",
            self.timestamp.format(LOG_RECORD_TIME_FORMAT),
            self.message
        )
    }
}

/// Handle to the shared log file. Holds only the path, so clones are cheap
/// and independent.
#[derive(Debug, Clone)]
pub struct SharedLog {
    path: PathBuf,
}

impl SharedLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the parent directory of the log file if it does not exist.
    pub async fn ensure_parent_dir(&self) -> io::Result<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                tokio::fs::create_dir_all(parent).await
            }
            _ => Ok(()),
        }
    }

    /// Append one record as a newline-terminated line.
    pub async fn append(&self, record: &LogRecord) -> io::Result<()> {
        self.ensure_parent_dir().await?;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        // Single write so the line lands in one append
        let line = format!("{}\n", record);
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }

    /// Read every line currently in the file.
    ///
    /// A missing file reads as empty. A trailing partial line is returned as
    /// is, and bytes torn mid-character are replaced rather than rejected.
    pub async fn read_lines(&self) -> io::Result<Vec<String>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        Ok(split_lines(&String::from_utf8_lossy(&bytes)))
    }

    /// The last `n` lines, oldest first, with surrounding whitespace trimmed.
    pub async fn tail(&self, n: usize) -> io::Result<Vec<String>> {
        let lines = self.read_lines().await?;
        let start = lines.len().saturating_sub(n);
        Ok(lines[start..]
            .iter()
            .map(|line| line.trim().to_string())
            .collect())
    }

    /// Total number of lines, counting a trailing partial line.
    pub async fn line_count(&self) -> io::Result<usize> {
        Ok(self.read_lines().await?.len())
    }
}

fn split_lines(contents: &str) -> Vec<String> {
    contents.lines().map(str::to_string).collect()
}
