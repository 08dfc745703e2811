//! Consumer of asynchronous delivery outcomes.

use crate::broker::ReportReceiver;
use logfeed_protocol::{DeliveryOutcome, DeliveryReport};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Totals over the collector's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryStats {
    pub delivered: u64,
    pub failed: u64,
}

/// Drains the report channel, logging each outcome as it arrives. Outcomes
/// may arrive in any order relative to dispatch; each is handled on its own.
pub struct DeliveryReportCollector {
    reports: ReportReceiver,
    stats: DeliveryStats,
}

impl DeliveryReportCollector {
    pub fn new(reports: ReportReceiver) -> Self {
        Self {
            reports,
            stats: DeliveryStats::default(),
        }
    }

    /// Run on its own task. The task ends when the last sender is dropped.
    pub fn spawn(self) -> JoinHandle<DeliveryStats> {
        tokio::spawn(self.run())
    }

    pub async fn run(mut self) -> DeliveryStats {
        while let Some(report) = self.reports.recv().await {
            self.record(&report);
        }
        info!(
            delivered = self.stats.delivered,
            failed = self.stats.failed,
            "Delivery report channel closed"
        );
        self.stats
    }

    fn record(&mut self, report: &DeliveryReport) {
        match &report.outcome {
            DeliveryOutcome::Success {
                topic,
                partition,
                offset,
            } => {
                self.stats.delivered += 1;
                info!(
                    key = %report.key,
                    topic = %topic,
                    partition,
                    offset,
                    "Successfully delivered message to topic {} [partition {}] at offset {}",
                    topic,
                    partition,
                    offset
                );
            }
            DeliveryOutcome::Failure { cause } => {
                self.stats.failed += 1;
                warn!(key = %report.key, cause = %cause, "Failed to deliver message: {}", cause);
            }
        }
    }
}
