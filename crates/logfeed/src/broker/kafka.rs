//! librdkafka-backed broker client.

use super::{BrokerClient, ReportSender};
use crate::config::BrokerConfig;
use crate::error::{MonitorError, Result, SubmitError};
use logfeed_protocol::{DeliveryOutcome, DeliveryReport, OutboundMessage};
use rdkafka::config::ClientConfig;
use rdkafka::producer::future_producer::OwnedDeliveryResult;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::info;

/// Wraps a `FutureProducer`. Each accepted message gets a small task that
/// awaits its delivery future and forwards the outcome.
pub struct KafkaBroker {
    producer: FutureProducer,
    runtime: Handle,
}

impl KafkaBroker {
    /// Build the producer. Must be called from inside a tokio runtime.
    pub fn connect(config: &BrokerConfig) -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| MonitorError::Runtime(format!("no tokio runtime: {}", e)))?;

        info!(
            broker = %config.broker,
            client_id = %config.client_id,
            "Configuring Kafka producer"
        );
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.broker)
            .set("client.id", &config.client_id)
            .set("retries", config.max_retry.to_string())
            .set("retry.backoff.ms", config.retry_backoff().as_millis().to_string())
            .set("socket.timeout.ms", config.timeout().as_millis().to_string())
            // Leader acknowledgement only.
            .set("acks", "1")
            .create()
            .map_err(|e| MonitorError::Broker(format!("failed to create Kafka producer: {}", e)))?;

        Ok(Self { producer, runtime })
    }
}

impl BrokerClient for KafkaBroker {
    fn submit(
        &self,
        message: OutboundMessage,
        reports: ReportSender,
    ) -> std::result::Result<(), SubmitError> {
        let record = FutureRecord::to(&message.topic)
            .key(&message.key)
            .payload(&message.value)
            .timestamp(message.timestamp.timestamp_millis());
        let delivery = self
            .producer
            .send_result(record)
            .map_err(|(err, _record)| SubmitError::new(err.to_string()))?;

        let OutboundMessage { key, topic, .. } = message;
        self.runtime.spawn(async move {
            let outcome = outcome_from(delivery.await, topic);
            let _ = reports.send(DeliveryReport { key, outcome });
        });
        Ok(())
    }

    fn flush(&self, timeout: Duration) -> Result<()> {
        self.producer
            .flush(Timeout::After(timeout))
            .map_err(|e| MonitorError::Broker(format!("flush failed: {}", e)))
    }
}

/// Map a resolved delivery future onto a report outcome. `Err` means the
/// producer went away before librdkafka reported back.
fn outcome_from<E>(
    result: std::result::Result<OwnedDeliveryResult, E>,
    topic: String,
) -> DeliveryOutcome {
    match result {
        Ok(Ok((partition, offset))) => DeliveryOutcome::Success {
            topic,
            partition,
            offset,
        },
        Ok(Err((err, _message))) => DeliveryOutcome::Failure {
            cause: err.to_string(),
        },
        Err(_canceled) => DeliveryOutcome::Failure {
            cause: "producer dropped before the delivery report arrived".to_string(),
        },
    }
}
