//! Packaging a delta into an outbound message.

use chrono::{DateTime, Utc};
use logfeed_protocol::{DeltaPayload, OutboundMessage};

/// Builds messages for one destination topic.
///
/// Keys are `<prefix>-<unix nanos>`. The nanosecond component is forced to
/// increase strictly, so two messages from the same builder never share a
/// key even when the clock is coarse or steps backwards.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    topic: String,
    key_prefix: String,
    last_key_nanos: i64,
}

impl MessageBuilder {
    pub fn new(topic: impl Into<String>, key_prefix: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            key_prefix: key_prefix.into(),
            last_key_nanos: i64::MIN,
        }
    }

    /// Wrap the delta bytes, unmodified, stamped with the current time.
    pub fn build(&mut self, delta: DeltaPayload) -> OutboundMessage {
        self.build_at(delta, Utc::now())
    }

    pub fn build_at(&mut self, delta: DeltaPayload, now: DateTime<Utc>) -> OutboundMessage {
        let nanos = now
            .timestamp_nanos_opt()
            .unwrap_or_else(|| now.timestamp_micros().saturating_mul(1_000));
        let key_nanos = nanos.max(self.last_key_nanos.saturating_add(1));
        self.last_key_nanos = key_nanos;

        OutboundMessage {
            key: format!("{}-{}", self.key_prefix, key_nanos),
            value: delta.bytes,
            timestamp: now,
            topic: self.topic.clone(),
        }
    }
}
