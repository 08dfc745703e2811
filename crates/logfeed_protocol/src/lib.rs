//! Shared data model for logfeed.
//!
//! The pipeline moves bytes through four shapes:
//!
//! ```text
//! ObservedFileState ──▶ DeltaPayload ──▶ OutboundMessage ──▶ DeliveryReport
//!   (stat result)      (appended range)   (keyed, stamped)    (broker ack)
//! ```
//!
//! Nothing here is persisted; every value lives for at most one poll tick,
//! except the scheduler's current `ObservedFileState`.

pub mod defaults;
pub mod types;

pub use types::{
    DeliveryOutcome, DeliveryReport, DeltaPayload, ObservedFileState, OutboundMessage,
};
