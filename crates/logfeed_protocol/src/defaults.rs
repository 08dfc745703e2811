//! Canonical default values shared by the configuration loader and the CLI.

/// Destination topic when the config file leaves `topic` unset.
pub const DEFAULT_TOPIC: &str = "hdfslog";
/// Producer `client.id` when the config file leaves `client_id` unset.
pub const DEFAULT_CLIENT_ID: &str = "hdfs-log-monitor";
/// Producer retry count handed to the broker client.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 100;
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;
/// Seconds between two observations of the monitored file.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_CONFIG_PATH: &str = "kafka_config.json";
/// Message keys look like `<prefix>-<unix nanos>`.
pub const DEFAULT_KEY_PREFIX: &str = "hdfs-log";
/// Upper bound on waiting for in-flight deliveries at shutdown.
pub const DEFAULT_FLUSH_TIMEOUT_SECS: u64 = 10;
