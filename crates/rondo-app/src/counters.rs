use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Observability counters owned by the coordinator.
///
/// All operations use [`Ordering::Relaxed`] — these are statistics, not
/// synchronization. The event source adapter increments `events_sent` and
/// `events_dropped` from interrupt context; everything else is written by
/// the round loop. Reset on process restart, never persisted.
#[derive(Debug, Default)]
pub struct AppCounters {
    rounds: AtomicU64,
    events_sent: AtomicU64,
    acks_received: AtomicU64,
    frames_received: AtomicU64,
    events_dropped: AtomicU64,
}

impl AppCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_round(&self) {
        self.rounds.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_event_sent(&self) {
        self.events_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_ack(&self) {
        self.acks_received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_frames_received(&self, n: u64) {
        self.frames_received.fetch_add(n, Ordering::Relaxed);
    }

    pub(crate) fn record_event_dropped(&self) {
        self.events_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Completed rounds since startup.
    pub fn rounds(&self) -> u64 {
        self.rounds.load(Ordering::Relaxed)
    }

    /// Event frames accepted by the transmit queue.
    pub fn events_sent(&self) -> u64 {
        self.events_sent.load(Ordering::Relaxed)
    }

    /// Own frames seen coming back — best-effort acknowledgments.
    pub fn acks_received(&self) -> u64 {
        self.acks_received.load(Ordering::Relaxed)
    }

    /// Frames drained by the sink, cumulative.
    pub fn frames_received(&self) -> u64 {
        self.frames_received.load(Ordering::Relaxed)
    }

    /// Event frames refused by the transmit queue and dropped.
    pub fn events_dropped(&self) -> u64 {
        self.events_dropped.load(Ordering::Relaxed)
    }

    /// A consistent-enough copy for logging or export.
    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            rounds: self.rounds(),
            events_sent: self.events_sent(),
            acks_received: self.acks_received(),
            frames_received: self.frames_received(),
            events_dropped: self.events_dropped(),
        }
    }
}

/// Point-in-time copy of [`AppCounters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountersSnapshot {
    pub rounds: u64,
    pub events_sent: u64,
    pub acks_received: u64,
    pub frames_received: u64,
    pub events_dropped: u64,
}
