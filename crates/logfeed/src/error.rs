//! Error types for the tail-and-forward pipeline

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Pipeline error type
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Failed to stat {path}: {source}")]
    Observe {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read {path} at offset {offset}: {source}")]
    Read {
        path: PathBuf,
        offset: u64,
        #[source]
        source: io::Error,
    },

    #[error("Invalid byte range [{start}, {end})")]
    InvalidRange { start: u64, end: u64 },

    #[error("Log file does not exist: {0}")]
    FileNotFound(PathBuf),

    #[error("Not a regular file: {0}")]
    NotAFile(PathBuf),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Broker client error: {0}")]
    Broker(String),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, MonitorError>;

/// A message the broker client refused to enqueue. The message is dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Submission rejected: {reason}")]
pub struct SubmitError {
    pub reason: String,
}

impl SubmitError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
