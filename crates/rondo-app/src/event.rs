use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rondo_bus::{BusService, Frame};

use crate::counters::AppCounters;

/// Event source adapter — turns an asynchronous hardware stimulus into one
/// queued outbound frame.
///
/// `raise` is the interrupt side: it only marks the pending flag. `service`
/// does the bounded, non-blocking work: build the marker frame, one
/// transmit enqueue, clear the flag. The round loop also services the
/// trigger at every wake, so a stimulus raised between rounds is flushed
/// no later than the next round. Both sides may run concurrently with the
/// round loop; neither blocks, loops, or allocates beyond the frame bytes.
/// An enqueue the bus refuses is dropped on the spot — retrying is the
/// application's business in a later round, not this adapter's.
///
/// Constructed only for reporter nodes; the sink has no event source.
pub struct EventTrigger<B: BusService> {
    bus: Arc<B>,
    node_id: u16,
    counters: Arc<AppCounters>,
    pending: AtomicBool,
}

impl<B: BusService> EventTrigger<B> {
    pub(crate) fn new(bus: Arc<B>, node_id: u16, counters: Arc<AppCounters>) -> Self {
        Self {
            bus,
            node_id,
            counters,
            pending: AtomicBool::new(false),
        }
    }

    /// Mark the stimulus pending. Safe from interrupt context.
    pub fn raise(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Whether a raised stimulus has not been serviced yet.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Service a pending stimulus, if any.
    ///
    /// The swap clears the pending condition before anything else runs, so
    /// the flag is never left set on return.
    pub fn service(&self) {
        if !self.pending.swap(false, Ordering::AcqRel) {
            return;
        }
        let frame = Frame::event(self.node_id);
        if self.bus.put_data(&frame.to_bytes()) {
            self.counters.record_event_sent();
            tracing::info!(
                node = self.node_id,
                sent = self.counters.events_sent(),
                "event triggered"
            );
        } else {
            self.counters.record_event_dropped();
            tracing::warn!(node = self.node_id, "can't queue event frame");
        }
    }

    /// Raise and service in one call — the shape of a GPIO edge handler.
    pub fn fire(&self) {
        self.raise();
        self.service();
    }
}
