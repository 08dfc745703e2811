//! Fire-and-forget hand-off of built messages to the broker client.

use crate::broker::{BrokerClient, ReportSender};
use crate::error::Result;
use logfeed_protocol::OutboundMessage;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// What happened to one message at submission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchStatus {
    /// Accepted; its outcome will arrive on the report channel.
    Submitted { key: String },
    /// Refused synchronously and dropped.
    Rejected { key: String, reason: String },
}

/// Submits messages without waiting for delivery. Owns a sender half of the
/// report channel; the channel closes once every dispatcher and every
/// in-flight delivery has let go of theirs.
pub struct DeliveryDispatcher {
    broker: Arc<dyn BrokerClient>,
    reports: ReportSender,
}

impl DeliveryDispatcher {
    pub fn new(broker: Arc<dyn BrokerClient>, reports: ReportSender) -> Self {
        Self { broker, reports }
    }

    pub fn dispatch(&self, message: OutboundMessage) -> DispatchStatus {
        let key = message.key.clone();
        let bytes = message.value.len();
        match self.broker.submit(message, self.reports.clone()) {
            Ok(()) => {
                debug!(key = %key, bytes, "Message submitted");
                DispatchStatus::Submitted { key }
            }
            Err(err) => {
                warn!(key = %key, bytes, error = %err, "Failed to send message to broker; dropping it");
                DispatchStatus::Rejected {
                    key,
                    reason: err.reason,
                }
            }
        }
    }

    /// Wait (bounded) for in-flight deliveries. Runs the blocking flush off
    /// the async worker threads.
    pub async fn flush(&self, timeout: Duration) -> Result<()> {
        let broker = Arc::clone(&self.broker);
        tokio::task::spawn_blocking(move || broker.flush(timeout))
            .await
            .map_err(|e| crate::error::MonitorError::Runtime(format!("flush task failed: {}", e)))?
    }
}
