//! The round loop and the per-role round handlers.
//!
//! The loop is the core state machine: `Suspended` while parked on the
//! poll channel, `ActiveSink` or `ActiveReporter` for the bounded body of
//! a round. Which active state a node visits is fixed at spawn by handler
//! selection — there is no per-round role branching.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use rondo_bus::{BusService, Frame, Poll};

use crate::config::AppConfig;
use crate::counters::AppCounters;
use crate::event::EventTrigger;
use crate::power::PowerManager;

/// Role-specific work for one round-slice.
///
/// Implementations must stay well within a fraction of the round period:
/// no blocking, no unbounded loops. The sink drain is the one loop here,
/// bounded by the backlog already queued when the round started — nothing
/// can be added to it mid-drain.
pub(super) trait RoundHandler<B: BusService>: Send {
    fn on_round_start(&mut self, bus: &B, counters: &AppCounters, round: u16);
}

/// The coordinator task body. Runs until the bus drops its poll sender.
pub(super) async fn round_loop<B: BusService>(
    bus: Arc<B>,
    mut handler: Box<dyn RoundHandler<B>>,
    trigger: Option<Arc<EventTrigger<B>>>,
    counters: Arc<AppCounters>,
    power: PowerManager,
    mut poll_rx: mpsc::Receiver<Poll>,
    round_tx: watch::Sender<u16>,
) {
    let mut round: u16 = 0;
    // Suspended until the bus grants the slot at the tail of a round.
    while poll_rx.recv().await.is_some() {
        power.on_wake();
        round = round.wrapping_add(1);
        tracing::trace!(round, "round start");

        // Flush a stimulus that was raised but not yet serviced, so a
        // pending event survives round pacing instead of sitting on the
        // flag forever.
        if let Some(trigger) = &trigger {
            trigger.service();
        }

        handler.on_round_start(&bus, &counters, round);

        counters.record_round();
        // Work done: suspend, then drop into low power for the idle
        // stretch until the next round.
        tracing::trace!(round, "suspending");
        power.arm();
        let _ = round_tx.send(round);
    }
    tracing::debug!("poll channel closed, round loop exiting");
}

/// Sink: drain the entire backlog queued for this round.
pub(super) struct SinkRound {
    buf: Vec<u8>,
}

impl SinkRound {
    pub(super) fn new(config: &AppConfig) -> Self {
        Self {
            buf: vec![0u8; config.max_frame_len],
        }
    }
}

impl<B: BusService> RoundHandler<B> for SinkRound {
    fn on_round_start(&mut self, bus: &B, counters: &AppCounters, _round: u16) {
        let mut received: u64 = 0;
        // Terminates: producers only enqueue between rounds, so the
        // backlog cannot grow while we drain it.
        loop {
            let len = bus.get_data(&mut self.buf);
            if len == 0 {
                break;
            }
            received += 1;
        }
        if received > 0 {
            counters.add_frames_received(received);
            tracing::info!(rcvd = counters.frames_received(), "round receipts");
        }
    }
}

/// Reporter: pull at most one frame, watch for our own identity coming
/// back, and originate traffic per the initiator policy.
pub(super) struct ReporterRound {
    node_id: u16,
    initiator: bool,
    register_round: u16,
    burst_after: u16,
    buf: Vec<u8>,
}

impl ReporterRound {
    pub(super) fn new(config: &AppConfig) -> Self {
        Self {
            node_id: config.node_id,
            initiator: config.initiators.contains(&config.node_id),
            register_round: config.register_round,
            burst_after: config.burst_after_round,
            buf: vec![0u8; config.max_frame_len],
        }
    }

    fn send_event<B: BusService>(&self, bus: &B, counters: &AppCounters) {
        let frame = Frame::event(self.node_id);
        if bus.put_data(&frame.to_bytes()) {
            counters.record_event_sent();
            tracing::info!(
                sent = counters.events_sent(),
                ack = counters.acks_received(),
                "event queued"
            );
        } else {
            counters.record_event_dropped();
            tracing::warn!("can't queue data");
        }
    }
}

impl<B: BusService> RoundHandler<B> for ReporterRound {
    fn on_round_start(&mut self, bus: &B, counters: &AppCounters, round: u16) {
        let len = bus.get_data(&mut self.buf);
        if len > 0 {
            match Frame::parse(&self.buf[..len]) {
                Ok(frame) if frame.sender() == self.node_id => {
                    // Our own frame came back: the sink acknowledged it.
                    counters.record_ack();
                    tracing::info!(
                        sent = counters.events_sent(),
                        ack = counters.acks_received(),
                        "ack received"
                    );
                }
                Ok(frame) => {
                    tracing::debug!(from = frame.sender(), "frame for another node");
                }
                Err(e) => {
                    tracing::debug!(error = %e, "unparseable frame");
                }
            }
        }

        if !self.initiator {
            return;
        }
        if round == self.register_round {
            // One dummy frame so the sink learns this node exists.
            self.send_event(bus, counters);
        }
        if round > self.burst_after {
            if let Some(elapsed) = bus.get_time(round) {
                tracing::trace!(elapsed, "bus time");
            }
            self.send_event(bus, counters);
        }
    }
}
