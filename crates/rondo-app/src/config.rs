use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Build-time configuration for one node.
///
/// Resolved and validated once before the round loop starts; nothing here
/// is mutable at runtime. The timing fields mirror the constants the bus
/// scheduler itself is compiled with — the application consumes them for
/// validation and logging, it does not hand them to the bus.
///
/// ```rust
/// use rondo_app::AppConfig;
///
/// let config = AppConfig::new(2, 28)
///     .initiators(vec![6, 22])
///     .burst_after_round(12);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// This node's identity. Fixed for the process lifetime.
    pub node_id: u16,
    /// Identity of the aggregating sink node.
    pub sink_id: u16,
    /// Length of one communication round.
    pub round_period: Duration,
    /// Duration of one flood slot within a round.
    pub slot_duration: Duration,
    /// Guard time around slot boundaries.
    pub guard: Duration,
    /// Longer guard used after missed schedules.
    pub long_guard: Duration,
    /// Maximum frame length the bus admits, id prefix included.
    pub max_frame_len: usize,
    /// Retransmissions per flood.
    pub flood_tx_count: u8,
    /// Worst-case oscillator deviation, in parts per million.
    pub max_clock_deviation_ppm: u32,
    /// Drop into the minimal-power configuration between rounds.
    pub sleep_between_rounds: bool,
    /// Nodes allowed to originate event traffic.
    ///
    /// Experiment policy carried as configuration; a node absent from this
    /// list still reports acknowledgments but never transmits on its own.
    pub initiators: Vec<u16>,
    /// Round after which initiators enqueue one event frame per round.
    pub burst_after_round: u16,
    /// Round at which initiators send their one registration frame.
    pub register_round: u16,
}

impl AppConfig {
    /// Configuration with the stock timing constants for `node_id` and the
    /// given sink.
    pub fn new(node_id: u16, sink_id: u16) -> Self {
        Self {
            node_id,
            sink_id,
            round_period: Duration::from_secs(1),
            slot_duration: Duration::from_millis(50),
            guard: Duration::from_millis(1),
            long_guard: Duration::from_millis(2),
            max_frame_len: rondo_bus::MAX_FRAME_LEN,
            flood_tx_count: 3,
            max_clock_deviation_ppm: 500,
            sleep_between_rounds: true,
            initiators: Vec::new(),
            burst_after_round: 12,
            register_round: 2,
        }
    }

    /// Set the round period.
    pub fn round_period(mut self, period: Duration) -> Self {
        self.round_period = period;
        self
    }

    /// Set the per-round slot duration.
    pub fn slot_duration(mut self, slot: Duration) -> Self {
        self.slot_duration = slot;
        self
    }

    /// Set the maximum admitted frame length (default: 127).
    pub fn max_frame_len(mut self, len: usize) -> Self {
        self.max_frame_len = len;
        self
    }

    /// Set the flood retransmission count (default: 3).
    pub fn flood_tx_count(mut self, count: u8) -> Self {
        self.flood_tx_count = count;
        self
    }

    /// Enable or disable the between-rounds low-power transition.
    pub fn sleep_between_rounds(mut self, enabled: bool) -> Self {
        self.sleep_between_rounds = enabled;
        self
    }

    /// Set the event-initiator allow-list.
    pub fn initiators(mut self, ids: Vec<u16>) -> Self {
        self.initiators = ids;
        self
    }

    /// Set the round after which initiators transmit every round.
    pub fn burst_after_round(mut self, round: u16) -> Self {
        self.burst_after_round = round;
        self
    }

    /// Set the round at which initiators send their registration frame.
    pub fn register_round(mut self, round: u16) -> Self {
        self.register_round = round;
        self
    }

    /// Check structural consistency. Called once by the coordinator before
    /// the round loop starts; any error here is fatal.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.node_id == 0 {
            return Err(AppError::Config("node id must not be zero".into()));
        }
        if self.sink_id == 0 {
            return Err(AppError::Config("sink id must not be zero".into()));
        }
        if self.max_frame_len < rondo_bus::ID_PREFIX_LEN {
            return Err(AppError::Config(format!(
                "max frame length {} cannot hold the sender id prefix",
                self.max_frame_len
            )));
        }
        if self.max_frame_len > rondo_bus::MAX_FRAME_LEN {
            return Err(AppError::Config(format!(
                "max frame length {} exceeds the bus limit {}",
                self.max_frame_len,
                rondo_bus::MAX_FRAME_LEN
            )));
        }
        if self.slot_duration >= self.round_period {
            return Err(AppError::Config(format!(
                "slot duration {:?} must be shorter than the round period {:?}",
                self.slot_duration, self.round_period
            )));
        }
        if self.guard >= self.slot_duration {
            return Err(AppError::Config(format!(
                "guard {:?} must be shorter than the slot {:?}",
                self.guard, self.slot_duration
            )));
        }
        if self.flood_tx_count == 0 {
            return Err(AppError::Config("flood retransmission count must be at least 1".into()));
        }
        // Role ambiguity (sink listed as initiator) is the role
        // resolver's check, not this one's.
        Ok(())
    }
}
