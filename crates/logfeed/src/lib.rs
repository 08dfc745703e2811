//! logfeed - forward a growing log file to Kafka
//!
//! Polls one append-only file on a fixed interval and sends every newly
//! appended byte range as one message. Delivery is asynchronous: outcomes
//! come back on a channel and are logged by a separate task.
//!
//! # Core Concepts
//!
//! - **Baseline**: size at startup; earlier content is never sent
//! - **Delta**: bytes appended since the last successful read
//! - **Delivery report**: broker's asynchronous success/failure for a message

pub mod broker;
pub mod config;
pub mod delta;
pub mod dispatch;
pub mod error;
pub mod message;
pub mod observer;
pub mod pipeline;
pub mod report;
pub mod scheduler;
pub mod source;

// Re-exports for convenience
pub use broker::{AckMode, BrokerClient, InMemoryBroker};
#[cfg(feature = "kafka")]
pub use broker::KafkaBroker;
pub use config::BrokerConfig;
pub use dispatch::{DeliveryDispatcher, DispatchStatus};
pub use error::{MonitorError, Result, SubmitError};
pub use message::MessageBuilder;
pub use pipeline::{run_pipeline, PipelineSettings, PipelineSummary};
pub use report::{DeliveryReportCollector, DeliveryStats};
pub use scheduler::{PollScheduler, SchedulerSettings, SchedulerStats, TickOutcome};
pub use source::{LocalLogFile, LogSource};
