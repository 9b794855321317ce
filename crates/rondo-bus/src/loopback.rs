use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

use crate::error::BusError;
use crate::frame::MAX_FRAME_LEN;
use crate::service::{BusService, Poll, RoleHint};

/// In-memory bus for tests and simulations.
///
/// Models the scheduler-owned queues: a bounded transmit queue (the bus
/// refuses frames when it is full, exactly like a saturated stream) and a
/// receive queue that tests stage frames into before pulsing a round.
/// Because staging and pulsing are separate calls, the round ordering
/// guarantee holds by construction: nothing staged after a pulse is
/// visible to the round that pulse started.
pub struct LoopbackBus {
    inner: Mutex<Inner>,
    tx_capacity: usize,
}

struct Inner {
    rx: VecDeque<Vec<u8>>,
    tx: VecDeque<Vec<u8>>,
    notify: Option<mpsc::Sender<Poll>>,
    hint: Option<RoleHint>,
    rounds_pulsed: u64,
}

impl LoopbackBus {
    pub fn new() -> Self {
        Self::with_tx_capacity(8)
    }

    /// A bus whose transmit queue holds at most `capacity` frames.
    ///
    /// `capacity == 0` refuses every enqueue — useful for backpressure
    /// tests.
    pub fn with_tx_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                rx: VecDeque::new(),
                tx: VecDeque::new(),
                notify: None,
                hint: None,
                rounds_pulsed: 0,
            }),
            tx_capacity: capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stage a frame in the receive queue for the next round.
    pub fn seed_rx(&self, frame: Vec<u8>) {
        self.lock().rx.push_back(frame);
    }

    /// Take every frame currently sitting in the transmit path.
    pub fn drain_tx(&self) -> Vec<Vec<u8>> {
        self.lock().tx.drain(..).collect()
    }

    /// Number of frames waiting in the transmit queue.
    pub fn tx_len(&self) -> usize {
        self.lock().tx.len()
    }

    /// The role hint recorded at `start`, if any.
    pub fn registered_hint(&self) -> Option<RoleHint> {
        self.lock().hint
    }

    /// Deliver one round-boundary poll notification.
    ///
    /// Panics if `start` was never called — a test driving rounds against
    /// an unregistered bus is broken.
    pub async fn pulse(&self) {
        let notify = {
            let mut inner = self.lock();
            inner.rounds_pulsed += 1;
            inner
                .notify
                .clone()
                .expect("pulse before start: no poll target registered")
        };
        // Send outside the lock; the channel applies round pacing.
        let _ = notify.send(Poll).await;
    }
}

impl Default for LoopbackBus {
    fn default() -> Self {
        Self::new()
    }
}

impl BusService for LoopbackBus {
    fn start(&self, hint: RoleHint, notify: mpsc::Sender<Poll>) -> Result<(), BusError> {
        let mut inner = self.lock();
        if inner.notify.is_some() {
            return Err(BusError::AlreadyStarted);
        }
        inner.notify = Some(notify);
        inner.hint = Some(hint);
        Ok(())
    }

    fn get_data(&self, buf: &mut [u8]) -> usize {
        let mut inner = self.lock();
        // Skip frames the caller's buffer cannot hold rather than hand
        // back a truncated prefix or a premature "empty" — a drain loop
        // must still see the rest of the backlog.
        while let Some(frame) = inner.rx.pop_front() {
            if frame.len() <= buf.len() {
                buf[..frame.len()].copy_from_slice(&frame);
                return frame.len();
            }
            tracing::warn!(len = frame.len(), "skipping frame larger than read buffer");
        }
        0
    }

    fn put_data(&self, data: &[u8]) -> bool {
        if data.len() > MAX_FRAME_LEN {
            return false;
        }
        let mut inner = self.lock();
        if inner.tx.len() >= self.tx_capacity {
            return false;
        }
        inner.tx.push_back(data.to_vec());
        true
    }

    fn get_time(&self, _round: u16) -> Option<u64> {
        Some(self.lock().rounds_pulsed)
    }
}
