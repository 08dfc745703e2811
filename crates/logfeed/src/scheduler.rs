//! Fixed-interval polling of the monitored file.
//!
//! The scheduler owns the last observed `(size, mtime)` and is the only code
//! that reads or replaces it. Each tick compares a fresh observation with it:
//!
//! - larger: read `[last.size, current.size)`, build a message, dispatch it,
//!   then advance the recorded size to the offset actually read
//! - same size, newer mtime: record the mtime, emit nothing
//! - smaller: treat as truncation/rotation, re-baseline, emit nothing
//!
//! State advances after a successful read, never after delivery. Ticks run
//! one after another, so deltas leave in file-offset order. Deltas are raw
//! bytes and may end mid-line if a writer is caught half way.

use crate::dispatch::{DeliveryDispatcher, DispatchStatus};
use crate::error::{MonitorError, Result};
use crate::message::MessageBuilder;
use crate::source::LogSource;
use logfeed_protocol::ObservedFileState;
use serde::Serialize;
use std::cmp::Ordering;
use std::future::Future;
use std::io::{self, Write};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy)]
pub struct SchedulerSettings {
    pub poll_interval: Duration,
    /// Write each delta between markers to the echo writer (stdout unless
    /// replaced with `with_echo_writer`).
    pub echo: bool,
}

/// What one tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Unchanged,
    /// Modification time moved, size did not.
    Touched { size: u64 },
    /// Bytes `[start, end)` were read and handed to the dispatcher.
    /// `end < requested_end` when the read came up short.
    Forwarded {
        start: u64,
        end: u64,
        requested_end: u64,
        dispatch: DispatchStatus,
    },
    /// The file had grown but nothing could be read; state kept.
    UnderRead { start: u64, requested_end: u64 },
    /// Size went down; baseline reset to the new size.
    Truncated { previous_size: u64, current_size: u64 },
    ObserveFailed,
    ReadFailed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SchedulerStats {
    pub ticks: u64,
    pub growth_events: u64,
    pub bytes_forwarded: u64,
    pub messages_dispatched: u64,
    pub submit_failures: u64,
    pub observe_failures: u64,
    pub read_failures: u64,
    pub under_reads: u64,
    pub truncations: u64,
}

pub struct PollScheduler<S: LogSource> {
    source: S,
    builder: MessageBuilder,
    dispatcher: DeliveryDispatcher,
    settings: SchedulerSettings,
    last: ObservedFileState,
    stats: SchedulerStats,
    echo_out: Box<dyn Write + Send>,
}

impl<S: LogSource> PollScheduler<S> {
    /// Take the baseline observation. Content already in the file is never
    /// forwarded.
    pub fn new(
        source: S,
        builder: MessageBuilder,
        dispatcher: DeliveryDispatcher,
        settings: SchedulerSettings,
    ) -> Result<Self> {
        if settings.poll_interval.is_zero() {
            return Err(MonitorError::Config(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        let baseline = source.observe()?;
        info!(
            path = %source.location().display(),
            size = baseline.size,
            modified_at = %baseline.modified_at,
            "Initial file size: {} bytes",
            baseline.size
        );
        Ok(Self {
            source,
            builder,
            dispatcher,
            settings,
            last: baseline,
            stats: SchedulerStats::default(),
            echo_out: Box::new(io::stdout()),
        })
    }

    /// Send `--echo` output somewhere other than stdout.
    pub fn with_echo_writer(mut self, out: impl Write + Send + 'static) -> Self {
        self.echo_out = Box::new(out);
        self
    }

    pub fn state(&self) -> ObservedFileState {
        self.last
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    /// Give up the dispatcher (and with it this scheduler's report sender).
    pub fn into_dispatcher(self) -> DeliveryDispatcher {
        self.dispatcher
    }

    /// Tick every `poll_interval` until `shutdown` resolves.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.settings.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately; the baseline already covers it.
        ticker.tick().await;

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!(ticks = self.stats.ticks, "Stopping poll loop");
                    break;
                }

                _ = ticker.tick() => {
                    self.tick();
                }
            }
        }
    }

    /// One observation and, if the file grew, one read + dispatch.
    pub fn tick(&mut self) -> TickOutcome {
        self.stats.ticks += 1;

        let current = match self.source.observe() {
            Ok(state) => state,
            Err(err) => {
                self.stats.observe_failures += 1;
                warn!(error = %err, "Failed to get file info; keeping previous state");
                return TickOutcome::ObserveFailed;
            }
        };

        match current.size.cmp(&self.last.size) {
            Ordering::Greater => self.forward_growth(current),
            Ordering::Less => {
                self.stats.truncations += 1;
                warn!(
                    path = %self.source.location().display(),
                    previous_size = self.last.size,
                    current_size = current.size,
                    "File shrank (truncated or rotated); resetting baseline"
                );
                let previous_size = self.last.size;
                self.last = current;
                TickOutcome::Truncated {
                    previous_size,
                    current_size: current.size,
                }
            }
            Ordering::Equal if current.modified_at > self.last.modified_at => {
                info!(
                    size = current.size,
                    "File modified but size unchanged (size: {} bytes)",
                    current.size
                );
                self.last = current;
                TickOutcome::Touched { size: current.size }
            }
            Ordering::Equal => TickOutcome::Unchanged,
        }
    }

    fn forward_growth(&mut self, current: ObservedFileState) -> TickOutcome {
        let start = self.last.size;
        let requested_end = current.size;
        self.stats.growth_events += 1;
        info!(
            new_bytes = requested_end - start,
            total_size = requested_end,
            "File updated: {} new bytes added (total size: {} bytes)",
            requested_end - start,
            requested_end
        );

        let delta = match self.source.read_delta(start, requested_end) {
            Ok(delta) => delta,
            Err(err) => {
                self.stats.read_failures += 1;
                warn!(error = %err, start, requested_end, "Failed to read new content; will retry");
                return TickOutcome::ReadFailed;
            }
        };

        if delta.is_empty() {
            self.stats.under_reads += 1;
            warn!(start, requested_end, "Read returned no bytes; will retry next tick");
            return TickOutcome::UnderRead {
                start,
                requested_end,
            };
        }
        let end = delta.end;
        if end < requested_end {
            self.stats.under_reads += 1;
            warn!(
                start,
                end,
                requested_end,
                "Short read: forwarding {} of {} bytes, remainder retried next tick",
                end - start,
                requested_end - start
            );
        }

        // Advance by what was read, not by what was asked for.
        self.last = ObservedFileState::new(end, current.modified_at);
        self.stats.bytes_forwarded += end - start;

        if self.settings.echo {
            if let Err(err) = self.echo(&delta.bytes) {
                warn!(error = %err, "Failed to echo new content");
            }
        } else {
            debug!(content = %String::from_utf8_lossy(&delta.bytes), "New content");
        }

        let message = self.builder.build(delta);
        let dispatch = self.dispatcher.dispatch(message);
        match dispatch {
            DispatchStatus::Submitted { .. } => self.stats.messages_dispatched += 1,
            DispatchStatus::Rejected { .. } => self.stats.submit_failures += 1,
        }

        TickOutcome::Forwarded {
            start,
            end,
            requested_end,
            dispatch,
        }
    }

    fn echo(&mut self, bytes: &[u8]) -> io::Result<()> {
        let out = &mut self.echo_out;
        writeln!(out, "--- New content ---")?;
        writeln!(out, "{}", String::from_utf8_lossy(bytes))?;
        writeln!(out, "------------------")?;
        out.flush()
    }
}
