//! Broker client that keeps everything in process memory.
//!
//! Backs `--dry-run` and the test-suite. Acknowledgements are either sent at
//! submission time or held until the caller completes them, in any order.
//! Payloads are only retained by a broker built with `recording`; otherwise
//! a message is dropped as soon as it has been acknowledged.

use super::{BrokerClient, ReportSender};
use crate::error::{Result, SubmitError};
use logfeed_protocol::{DeliveryOutcome, DeliveryReport, OutboundMessage};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AckMode {
    /// Report success (partition 0, next offset) as soon as a message is submitted.
    #[default]
    Immediate,
    /// Hold reports until `complete` / `complete_all` is called.
    Manual,
}

struct PendingAck {
    message: OutboundMessage,
    reports: ReportSender,
}

#[derive(Default)]
struct State {
    accepted: u64,
    recorded: Vec<OutboundMessage>,
    pending: Vec<PendingAck>,
    next_offset: i64,
    rejections_left: usize,
}

#[derive(Default)]
pub struct InMemoryBroker {
    mode: AckMode,
    record: bool,
    state: Mutex<State>,
}

impl InMemoryBroker {
    /// Broker that keeps only counters and the offset sequence.
    pub fn new(mode: AckMode) -> Self {
        Self {
            mode,
            record: false,
            state: Mutex::new(State::default()),
        }
    }

    /// Broker that also keeps a copy of every accepted message, for
    /// inspection through `submitted`.
    pub fn recording(mode: AckMode) -> Self {
        Self {
            record: true,
            ..Self::new(mode)
        }
    }

    /// Refuse the next `count` submissions synchronously.
    pub fn reject_next(&self, count: usize) {
        self.lock().rejections_left = count;
    }

    /// Every message accepted so far, in submission order. Always empty
    /// unless the broker was built with `recording`.
    pub fn submitted(&self) -> Vec<OutboundMessage> {
        self.lock().recorded.clone()
    }

    /// Number of messages accepted so far.
    pub fn accepted(&self) -> u64 {
        self.lock().accepted
    }

    /// Keys of the messages still waiting for an acknowledgement.
    pub fn pending_keys(&self) -> Vec<String> {
        self.lock()
            .pending
            .iter()
            .map(|p| p.message.key.clone())
            .collect()
    }

    /// Report `outcome` for the pending message with `key`.
    /// Returns false if no such message is pending.
    pub fn complete(&self, key: &str, outcome: DeliveryOutcome) -> bool {
        let ack = {
            let mut state = self.lock();
            match state.pending.iter().position(|p| p.message.key == key) {
                Some(index) => state.pending.remove(index),
                None => return false,
            }
        };
        let _ = ack.reports.send(DeliveryReport {
            key: ack.message.key,
            outcome,
        });
        true
    }

    /// Acknowledge every pending message successfully, newest first.
    pub fn complete_all(&self) -> usize {
        let acks: Vec<PendingAck> = {
            let mut state = self.lock();
            let mut acks: Vec<PendingAck> = state.pending.drain(..).collect();
            acks.reverse();
            acks
        };
        let count = acks.len();
        for ack in acks {
            let outcome = self.success_for(&ack.message);
            let _ = ack.reports.send(DeliveryReport {
                key: ack.message.key,
                outcome,
            });
        }
        count
    }

    fn success_for(&self, message: &OutboundMessage) -> DeliveryOutcome {
        let mut state = self.lock();
        let offset = state.next_offset;
        state.next_offset += 1;
        DeliveryOutcome::Success {
            topic: message.topic.clone(),
            partition: 0,
            offset,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panic while holding the lock leaves plain data behind; keep going.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl BrokerClient for InMemoryBroker {
    fn submit(
        &self,
        message: OutboundMessage,
        reports: ReportSender,
    ) -> std::result::Result<(), SubmitError> {
        {
            let mut state = self.lock();
            if state.rejections_left > 0 {
                state.rejections_left -= 1;
                return Err(SubmitError::new("Local: Queue full"));
            }
            state.accepted += 1;
            if self.record {
                state.recorded.push(message.clone());
            }
            if self.mode == AckMode::Manual {
                state.pending.push(PendingAck { message, reports });
                return Ok(());
            }
        }

        let outcome = self.success_for(&message);
        let _ = reports.send(DeliveryReport {
            key: message.key,
            outcome,
        });
        Ok(())
    }

    fn flush(&self, _timeout: Duration) -> Result<()> {
        Ok(())
    }
}
