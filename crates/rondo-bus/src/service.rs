use tokio::sync::mpsc;

use crate::error::BusError;

/// Role hint handed to the bus at registration.
///
/// The bus uses it for stream admission only; the application core derives
/// its actual role on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleHint {
    Sink,
    Reporter,
}

/// Round-boundary poll notification.
///
/// Delivered exactly once per communication round, when the application's
/// slot at the tail of the round opens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Poll;

/// Accessor seam to the external round-scheduled bus.
///
/// Queue storage is owned and synchronized by the bus; consumers only
/// enqueue and dequeue through these calls. All accessors are non-blocking
/// and O(1) — `put_data` may be invoked from interrupt context, so an
/// implementation must never block or allocate unboundedly there.
pub trait BusService: Send + Sync + 'static {
    /// Register the application task for poll notifications.
    ///
    /// The bus sends one [`Poll`] on `notify` per round. Registering twice
    /// is an error.
    fn start(&self, hint: RoleHint, notify: mpsc::Sender<Poll>) -> Result<(), BusError>;

    /// Dequeue the next pending frame into `buf`.
    ///
    /// Returns the frame length, or `0` when no data is available. An
    /// empty return is the expected terminator of a drain loop, not an
    /// error. Frames queued by other nodes during the current round are
    /// never visible before the next round.
    fn get_data(&self, buf: &mut [u8]) -> usize;

    /// Enqueue `data` for transmission in a later round.
    ///
    /// Returns `false` when the bus refuses the frame (transmit queue full
    /// or the stream not yet admitted). The caller decides whether that is
    /// worth retrying; the bus itself never does.
    fn put_data(&self, data: &[u8]) -> bool;

    /// Elapsed bus time for `round`, if the implementation tracks it.
    fn get_time(&self, _round: u16) -> Option<u64> {
        None
    }
}
