//! Wiring of the whole tail-and-forward pipeline with an orderly shutdown.
//!
//! ```text
//! PollScheduler ──▶ DeliveryDispatcher ──▶ BrokerClient
//!                                              │ (async)
//!                     DeliveryReportCollector ◀┘ report channel
//! ```
//!
//! The scheduler and the collector share nothing but the report channel.

use crate::broker::{report_channel, BrokerClient};
use crate::dispatch::DeliveryDispatcher;
use crate::error::Result;
use crate::message::MessageBuilder;
use crate::report::{DeliveryReportCollector, DeliveryStats};
use crate::scheduler::{PollScheduler, SchedulerSettings, SchedulerStats};
use crate::source::LogSource;
use logfeed_protocol::defaults::{DEFAULT_FLUSH_TIMEOUT_SECS, DEFAULT_KEY_PREFIX, DEFAULT_TOPIC};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub topic: String,
    pub key_prefix: String,
    pub poll_interval: Duration,
    pub echo: bool,
    /// Bound on waiting for in-flight deliveries, and again for the
    /// collector to drain, at shutdown.
    pub flush_timeout: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            topic: DEFAULT_TOPIC.to_string(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            poll_interval: Duration::from_secs(
                logfeed_protocol::defaults::DEFAULT_POLL_INTERVAL_SECS,
            ),
            echo: false,
            flush_timeout: Duration::from_secs(DEFAULT_FLUSH_TIMEOUT_SECS),
        }
    }
}

/// Counters from both halves of the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineSummary {
    pub scheduler: SchedulerStats,
    pub deliveries: DeliveryStats,
    /// False when the collector had to be aborted at shutdown.
    pub drained: bool,
}

/// Run until `shutdown` resolves, then flush and drain.
///
/// Fails only at startup (baseline observation, invalid settings).
pub async fn run_pipeline<S, F>(
    source: S,
    broker: Arc<dyn BrokerClient>,
    settings: PipelineSettings,
    shutdown: F,
) -> Result<PipelineSummary>
where
    S: LogSource,
    F: Future<Output = ()>,
{
    let (report_tx, report_rx) = report_channel();
    let mut collector = DeliveryReportCollector::new(report_rx).spawn();

    let dispatcher = DeliveryDispatcher::new(broker, report_tx);
    let builder = MessageBuilder::new(settings.topic.clone(), settings.key_prefix.clone());
    let mut scheduler = match PollScheduler::new(
        source,
        builder,
        dispatcher,
        SchedulerSettings {
            poll_interval: settings.poll_interval,
            echo: settings.echo,
        },
    ) {
        Ok(scheduler) => scheduler,
        Err(err) => {
            collector.abort();
            return Err(err);
        }
    };

    scheduler.run(shutdown).await;
    let scheduler_stats = scheduler.stats();

    let dispatcher = scheduler.into_dispatcher();
    info!("Flushing in-flight deliveries...");
    if let Err(err) = dispatcher.flush(settings.flush_timeout).await {
        warn!(error = %err, "Flush did not complete; undelivered messages may be lost");
    }
    // Last pipeline-held sender; the collector ends once in-flight reports land.
    drop(dispatcher);

    let (deliveries, drained) = match tokio::time::timeout(settings.flush_timeout, &mut collector).await {
        Ok(Ok(stats)) => (stats, true),
        Ok(Err(err)) => {
            warn!(error = %err, "Delivery report collector failed");
            (DeliveryStats::default(), false)
        }
        Err(_) => {
            warn!("Delivery reports still outstanding after flush timeout; giving up on them");
            collector.abort();
            (DeliveryStats::default(), false)
        }
    };

    let summary = PipelineSummary {
        scheduler: scheduler_stats,
        deliveries,
        drained,
    };
    info!(
        growth_events = summary.scheduler.growth_events,
        bytes_forwarded = summary.scheduler.bytes_forwarded,
        delivered = summary.deliveries.delivered,
        failed = summary.deliveries.failed,
        "Pipeline stopped"
    );
    Ok(summary)
}
