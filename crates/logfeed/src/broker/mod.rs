//! Seam between the pipeline and the message broker client.
//!
//! A client enqueues a message without waiting for the broker and later
//! sends exactly one `DeliveryReport` for it on the supplied channel. Retry
//! and backoff are the client's own business.

use crate::error::{Result, SubmitError};
use logfeed_protocol::{DeliveryReport, OutboundMessage};
use std::time::Duration;
use tokio::sync::mpsc;

mod memory;
#[cfg(feature = "kafka")]
mod kafka;

pub use memory::{AckMode, InMemoryBroker};
#[cfg(feature = "kafka")]
pub use kafka::KafkaBroker;

/// Sending half of the delivery-report channel.
pub type ReportSender = mpsc::UnboundedSender<DeliveryReport>;
/// Receiving half of the delivery-report channel.
pub type ReportReceiver = mpsc::UnboundedReceiver<DeliveryReport>;

/// Create the channel that carries delivery outcomes to the collector.
pub fn report_channel() -> (ReportSender, ReportReceiver) {
    mpsc::unbounded_channel()
}

/// Asynchronous producer.
pub trait BrokerClient: Send + Sync {
    /// Enqueue `message` and return immediately. An `Err` means the message
    /// was not accepted and no report will follow.
    fn submit(
        &self,
        message: OutboundMessage,
        reports: ReportSender,
    ) -> std::result::Result<(), SubmitError>;

    /// Block until in-flight messages are delivered or `timeout` passes.
    fn flush(&self, timeout: Duration) -> Result<()>;
}
