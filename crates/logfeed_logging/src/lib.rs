//! Shared logging setup for logfeed binaries.
//!
//! Every binary logs to stderr and, when a log directory is usable, to a
//! daily-rolled file `<log_dir>/<app_name>.<YYYY-MM-DD>.log`. Only the most
//! recent `MAX_LOG_FILES` files are kept.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "logfeed=info";
const VERBOSE_LOG_FILTER: &str = "logfeed=debug,info";
const MAX_LOG_FILES: usize = 5;
const LOG_FILE_SUFFIX: &str = "log";

/// Logging configuration shared by logfeed binaries.
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    /// Raise console output to debug level.
    pub verbose: bool,
    /// Overrides the default `~/.logfeed/logs` location.
    pub log_dir: Option<PathBuf>,
}

/// Keeps the background file writer alive. Buffered lines are flushed when
/// this is dropped, so hold it until the process is about to exit.
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global tracing subscriber.
///
/// A log directory that cannot be created downgrades to console-only
/// logging instead of failing startup.
pub fn init_logging(config: LogConfig<'_>) -> Result<LogGuard> {
    let file_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let console_filter = if config.verbose {
        EnvFilter::new(VERBOSE_LOG_FILTER)
    } else {
        file_filter.clone()
    };

    let log_dir = config.log_dir.unwrap_or_else(logs_dir);
    let mut guard = None;
    let file_layer = match file_appender(&log_dir, config.app_name) {
        Ok(appender) => {
            let (writer, worker) = tracing_appender::non_blocking(appender);
            guard = Some(worker);
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_filter(file_filter),
            )
        }
        Err(err) => {
            eprintln!("Warning: file logging disabled: {:#}", err);
            None
        }
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(LogGuard { _file: guard })
}

/// Daily-rolled appender for `<log_dir>/<app_name>.<date>.log`, creating
/// the directory if needed.
pub fn file_appender(log_dir: &Path, app_name: &str) -> Result<RollingFileAppender> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(app_name)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(MAX_LOG_FILES)
        .build(log_dir)
        .with_context(|| format!("Failed to open log file in {}", log_dir.display()))
}

/// Home directory for logfeed state: `$LOGFEED_HOME`, else `~/.logfeed`.
pub fn logfeed_home() -> PathBuf {
    if let Ok(override_path) = std::env::var("LOGFEED_HOME") {
        return PathBuf::from(override_path);
    }
    dirs::home_dir()
        .map(|home| home.join(".logfeed"))
        .unwrap_or_else(|| PathBuf::from(".logfeed"))
}

/// Default log directory: `<logfeed_home>/logs`.
pub fn logs_dir() -> PathBuf {
    logfeed_home().join("logs")
}
