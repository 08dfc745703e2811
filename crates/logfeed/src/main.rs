//! logfeed launcher
//!
//! Validates the target file and broker configuration, then runs the poll
//! loop until SIGINT/SIGTERM. Startup problems exit non-zero; nothing after
//! startup does.

use anyhow::{Context, Result};
use clap::Parser;
use logfeed::{
    run_pipeline, AckMode, BrokerClient, BrokerConfig, InMemoryBroker, LocalLogFile,
    PipelineSettings, PipelineSummary,
};
use logfeed_logging::LogConfig;
use logfeed_protocol::defaults::{DEFAULT_CONFIG_PATH, DEFAULT_FLUSH_TIMEOUT_SECS};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "logfeed", about = "Forward lines appended to a log file to Kafka")]
struct Cli {
    /// Path to the log file to monitor
    #[arg(short = 'f', long, env = "LOGFEED_FILE")]
    file: PathBuf,

    /// Check interval in seconds
    #[arg(
        short = 'i',
        long,
        env = "LOGFEED_INTERVAL",
        default_value_t = logfeed_protocol::defaults::DEFAULT_POLL_INTERVAL_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    interval: u64,

    /// Path to the Kafka configuration file (JSON)
    #[arg(short = 'c', long, env = "LOGFEED_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Enable verbose logging (debug to stderr)
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Directory for the daily log files (default: ~/.logfeed/logs)
    #[arg(long, env = "LOGFEED_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Print each forwarded chunk on stdout
    #[arg(long)]
    echo: bool,

    /// Acknowledge messages in memory instead of sending them to Kafka
    #[arg(long)]
    dry_run: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Held until exit so buffered file output is flushed.
    let _log_guard = match logfeed_logging::init_logging(LogConfig {
        app_name: "logfeed",
        verbose: cli.verbose,
        log_dir: cli.log_dir.clone(),
    }) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("Warning: failed to initialize logging: {:#}", err);
            None
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Error: failed to start async runtime: {}", err);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<PipelineSummary> {
    let path = logfeed::observer::resolve_target(&cli.file)
        .with_context(|| format!("Cannot monitor {}", cli.file.display()))?;
    let config = BrokerConfig::load(&cli.config).context("Failed to load Kafka configuration")?;

    info!(broker = %config.broker, "Loaded Kafka broker address: {}", config.broker);
    info!("Starting to monitor log file: {}", path.display());
    info!("Checking for updates every {} seconds", cli.interval);
    info!("Sending log updates to Kafka topic: {}", config.topic);

    let broker = connect_broker(&config, cli.dry_run)?;
    let settings = PipelineSettings {
        topic: config.topic.clone(),
        key_prefix: config.key_prefix.clone(),
        poll_interval: Duration::from_secs(cli.interval),
        echo: cli.echo,
        flush_timeout: Duration::from_secs(DEFAULT_FLUSH_TIMEOUT_SECS),
    };

    let summary = run_pipeline(LocalLogFile::new(path), broker, settings, shutdown_signal())
        .await
        .context("Failed to start monitoring")?;

    match serde_json::to_string(&summary) {
        Ok(json) => info!(summary = %json, "Shutdown complete"),
        Err(err) => warn!(error = %err, "Shutdown complete; summary unavailable"),
    }
    Ok(summary)
}

fn connect_broker(config: &BrokerConfig, dry_run: bool) -> Result<Arc<dyn BrokerClient>> {
    if dry_run {
        info!("Dry run: messages are acknowledged in memory, nothing is sent");
        return Ok(Arc::new(InMemoryBroker::new(AckMode::Immediate)));
    }

    connect_kafka(config)
}

#[cfg(feature = "kafka")]
fn connect_kafka(config: &BrokerConfig) -> Result<Arc<dyn BrokerClient>> {
    let producer =
        logfeed::KafkaBroker::connect(config).context("Failed to create Kafka producer")?;
    Ok(Arc::new(producer))
}

#[cfg(not(feature = "kafka"))]
fn connect_kafka(config: &BrokerConfig) -> Result<Arc<dyn BrokerClient>> {
    anyhow::bail!(
        "built without Kafka support; rerun with --dry-run (broker {})",
        config.broker
    )
}

/// Resolves on SIGINT (Ctrl+C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["logfeed", "--file", "/var/log/hadoop/namenode.log"]).unwrap();
        assert_eq!(cli.interval, 5);
        assert_eq!(cli.config, PathBuf::from("kafka_config.json"));
        assert!(!cli.dry_run);
        assert!(!cli.echo);
    }

    #[test]
    fn test_cli_rejects_zero_interval() {
        let result = Cli::try_parse_from(["logfeed", "-f", "a.log", "-i", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_requires_file() {
        assert!(Cli::try_parse_from(["logfeed"]).is_err());
    }
}
