//! Broker configuration loaded from a JSON file.
//!
//! Every field is optional in the file. Absent, empty and zero values mean
//! "unset" and take the defaults from `logfeed_protocol::defaults`; only the
//! broker address has no default.

use crate::error::{MonitorError, Result};
use logfeed_protocol::defaults::{
    DEFAULT_CLIENT_ID, DEFAULT_KEY_PREFIX, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_BACKOFF_MS,
    DEFAULT_TIMEOUT_MS, DEFAULT_TOPIC,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Destination identity and producer tuning knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Bootstrap address, e.g. `kafka-1:9092`.
    #[serde(default)]
    pub broker: String,

    #[serde(default)]
    pub topic: String,

    #[serde(default)]
    pub client_id: String,

    /// Retries performed by the producer itself before a failure is reported.
    #[serde(default)]
    pub max_retry: u32,

    #[serde(default)]
    pub retry_backoff_ms: u64,

    /// Socket timeout handed to the producer.
    #[serde(default)]
    pub timeout_ms: u64,

    #[serde(default)]
    pub key_prefix: String,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            broker: String::new(),
            topic: DEFAULT_TOPIC.to_string(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            max_retry: DEFAULT_MAX_RETRIES,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

impl BrokerConfig {
    /// Load, fill defaults and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MonitorError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config: BrokerConfig =
            serde_json::from_str(&content).map_err(|source| MonitorError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        let config = config.with_defaults();
        config.validate()?;
        Ok(config)
    }

    /// Replace unset (empty or zero) fields with their defaults.
    pub fn with_defaults(mut self) -> Self {
        let defaults = BrokerConfig::default();
        if self.topic.trim().is_empty() {
            self.topic = defaults.topic;
        }
        if self.client_id.trim().is_empty() {
            self.client_id = defaults.client_id;
        }
        if self.max_retry == 0 {
            self.max_retry = defaults.max_retry;
        }
        if self.retry_backoff_ms == 0 {
            self.retry_backoff_ms = defaults.retry_backoff_ms;
        }
        if self.timeout_ms == 0 {
            self.timeout_ms = defaults.timeout_ms;
        }
        if self.key_prefix.trim().is_empty() {
            self.key_prefix = defaults.key_prefix;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.broker.trim().is_empty() {
            return Err(MonitorError::Config(
                "`broker` must name at least one bootstrap address".to_string(),
            ));
        }
        if self.topic.chars().any(char::is_whitespace) {
            return Err(MonitorError::Config(format!(
                "invalid topic name '{}'",
                self.topic
            )));
        }
        Ok(())
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("kafka_config.json");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{"broker": "kafka-1:9092"}"#);

        let config = BrokerConfig::load(&path).unwrap();
        assert_eq!(config.broker, "kafka-1:9092");
        assert_eq!(config.topic, "hdfslog");
        assert_eq!(config.client_id, "hdfs-log-monitor");
        assert_eq!(config.max_retry, 3);
        assert_eq!(config.retry_backoff_ms, 100);
        assert_eq!(config.timeout_ms, 5000);
        assert_eq!(config.key_prefix, "hdfs-log");
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_zero_and_empty_values_count_as_unset() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"{"broker": "b:9092", "topic": "", "max_retry": 0, "retry_backoff_ms": 0, "timeout_ms": 0}"#,
        );

        let config = BrokerConfig::load(&path).unwrap();
        assert_eq!(config.topic, "hdfslog");
        assert_eq!(config.max_retry, 3);
        assert_eq!(config.retry_backoff(), Duration::from_millis(100));
        assert_eq!(config.timeout_ms, 5000);
    }

    #[test]
    fn test_explicit_values_are_kept() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"{
                "broker": "10.0.0.5:9092",
                "topic": "namenode",
                "client_id": "nn-tail",
                "max_retry": 7,
                "retry_backoff_ms": 250,
                "timeout_ms": 1500,
                "key_prefix": "nn"
            }"#,
        );

        let config = BrokerConfig::load(&path).unwrap();
        assert_eq!(
            config,
            BrokerConfig {
                broker: "10.0.0.5:9092".to_string(),
                topic: "namenode".to_string(),
                client_id: "nn-tail".to_string(),
                max_retry: 7,
                retry_backoff_ms: 250,
                timeout_ms: 1500,
                key_prefix: "nn".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = BrokerConfig::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, MonitorError::Config(_)));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{"broker": "b:9092", "max_retry": "three"}"#);
        let err = BrokerConfig::load(&path).unwrap_err();
        assert!(matches!(err, MonitorError::ConfigParse { .. }));
    }

    #[test]
    fn test_empty_broker_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{"topic": "hdfslog"}"#);
        let err = BrokerConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("broker"));
    }
}
