//! Values exchanged between the pipeline stages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Size and modification time of the monitored file at one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedFileState {
    /// File length in bytes.
    pub size: u64,
    pub modified_at: DateTime<Utc>,
}

impl ObservedFileState {
    pub fn new(size: u64, modified_at: DateTime<Utc>) -> Self {
        Self { size, modified_at }
    }
}

/// Bytes read from the half-open range `[start, end)` of the monitored file.
///
/// `end` is always `start + bytes.len()`: it records the offset actually
/// reached, which may be short of what was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaPayload {
    pub bytes: Vec<u8>,
    pub start: u64,
    pub end: u64,
}

impl DeltaPayload {
    pub fn new(start: u64, bytes: Vec<u8>) -> Self {
        let end = start + bytes.len() as u64;
        Self { bytes, start, end }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A message ready for the broker. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub key: String,
    pub value: Vec<u8>,
    pub timestamp: DateTime<Utc>,
    pub topic: String,
}

/// Result of one delivery attempt as reported by the broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DeliveryOutcome {
    Success {
        topic: String,
        partition: i32,
        offset: i64,
    },
    Failure {
        cause: String,
    },
}

impl DeliveryOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DeliveryOutcome::Success { .. })
    }
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryOutcome::Success {
                topic,
                partition,
                offset,
            } => write!(f, "delivered to {} [partition {}] at offset {}", topic, partition, offset),
            DeliveryOutcome::Failure { cause } => write!(f, "delivery failed: {}", cause),
        }
    }
}

/// A delivery outcome correlated with the key of the message it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReport {
    pub key: String,
    pub outcome: DeliveryOutcome,
}
