/// End-to-end round loop tests over the loopback bus.
///
/// Each test spawns a coordinator against a `LoopbackBus`, drives rounds
/// with explicit pulses, and observes the outcome through the handle's
/// counters and round watch.
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::timeout;

use rondo_app::{AppConfig, AppError, Coordinator, NoopSwitch, PowerSwitch, Role};
use rondo_bus::{BusService, Frame, LoopbackBus};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Block until the round counter reaches `round` (5 s safety timeout).
async fn wait_for_round(rounds: &mut watch::Receiver<u16>, round: u16) {
    timeout(Duration::from_secs(5), async {
        while *rounds.borrow() < round {
            rounds
                .changed()
                .await
                .expect("round loop ended before target round");
        }
    })
    .await
    .expect("timed out waiting for round");
}

struct CountingSwitch(AtomicU32);

impl CountingSwitch {
    fn new() -> Arc<Self> {
        Arc::new(Self(AtomicU32::new(0)))
    }

    fn entries(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }
}

impl PowerSwitch for CountingSwitch {
    fn enter_low_power(&self) -> Result<(), AppError> {
        self.0.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[tokio::test]
async fn round_counter_increments_by_one_per_poll() {
    init_tracing();
    let bus = Arc::new(LoopbackBus::new());
    let handle = Coordinator::spawn(bus.clone(), Arc::new(NoopSwitch), AppConfig::new(28, 28))
        .expect("spawn sink");
    assert_eq!(handle.role(), Role::Sink);

    let mut rounds = handle.rounds();
    for expected in 1u16..=5 {
        bus.pulse().await;
        wait_for_round(&mut rounds, expected).await;
        assert_eq!(*rounds.borrow(), expected, "exactly one increment per poll");
    }
    assert_eq!(handle.counters().rounds(), 5);
}

/// Three frames queued before poll 10 all drain in round 10.
#[tokio::test]
async fn sink_drains_backlog_in_one_round() {
    init_tracing();
    let bus = Arc::new(LoopbackBus::new());
    let handle = Coordinator::spawn(bus.clone(), Arc::new(NoopSwitch), AppConfig::new(28, 28))
        .expect("spawn sink");
    let mut rounds = handle.rounds();

    // Phase 1: nine empty rounds
    for _ in 0..9 {
        bus.pulse().await;
    }
    wait_for_round(&mut rounds, 9).await;
    assert_eq!(handle.counters().frames_received(), 0);

    // Phase 2: backlog of three, then poll 10
    for sender in [2u16, 6, 22] {
        bus.seed_rx(Frame::event(sender).to_bytes());
    }
    bus.pulse().await;
    wait_for_round(&mut rounds, 10).await;

    assert_eq!(
        handle.counters().frames_received(),
        3,
        "per-round receipt count equals the staged backlog"
    );
    let mut buf = [0u8; 8];
    assert_eq!(bus.get_data(&mut buf), 0, "receive queue empty after drain");
}

#[tokio::test]
async fn reporter_counts_only_own_frames_as_acks() {
    init_tracing();
    let bus = Arc::new(LoopbackBus::new());
    let handle = Coordinator::spawn(bus.clone(), Arc::new(NoopSwitch), AppConfig::new(28, 1))
        .expect("spawn reporter");
    assert_eq!(handle.role(), Role::Reporter);
    let mut rounds = handle.rounds();

    // A foreign frame leaves the ack count unchanged
    bus.seed_rx(Frame::event(6).to_bytes());
    bus.pulse().await;
    wait_for_round(&mut rounds, 1).await;
    assert_eq!(handle.counters().acks_received(), 0);

    // Our own identity coming back is the acknowledgment
    bus.seed_rx(Frame::event(28).to_bytes());
    bus.pulse().await;
    wait_for_round(&mut rounds, 2).await;
    assert_eq!(handle.counters().acks_received(), 1);
}

/// Initiator 28 with threshold 12: round 13 queues exactly one event
/// frame carrying sender identity 28.
#[tokio::test]
async fn initiator_bursts_after_threshold_round() {
    init_tracing();
    let bus = Arc::new(LoopbackBus::with_tx_capacity(16));
    let config = AppConfig::new(28, 1)
        .initiators(vec![6, 22, 28])
        .burst_after_round(12);
    let handle =
        Coordinator::spawn(bus.clone(), Arc::new(NoopSwitch), config).expect("spawn reporter");
    let mut rounds = handle.rounds();

    for _ in 0..12 {
        bus.pulse().await;
    }
    wait_for_round(&mut rounds, 12).await;
    bus.drain_tx(); // leave the transmit queue empty before poll 13
    let sent_before = handle.counters().events_sent();

    bus.pulse().await;
    wait_for_round(&mut rounds, 13).await;

    assert_eq!(
        handle.counters().events_sent(),
        sent_before + 1,
        "round 13 queues exactly one event"
    );
    let tx = bus.drain_tx();
    assert_eq!(tx.len(), 1);
    assert_eq!(Frame::parse(&tx[0]).unwrap().sender(), 28);
}

/// A stimulus that only raised the pending flag is flushed by the round
/// loop on the next wake — never lost to round pacing.
#[tokio::test]
async fn raised_stimulus_is_serviced_on_next_round() {
    init_tracing();
    let bus = Arc::new(LoopbackBus::new());
    let handle = Coordinator::spawn(bus.clone(), Arc::new(NoopSwitch), AppConfig::new(28, 1))
        .expect("spawn reporter");
    let trigger = handle.trigger().expect("reporter has an event trigger");
    let mut rounds = handle.rounds();

    trigger.raise();
    assert!(trigger.is_pending());
    assert_eq!(handle.counters().events_sent(), 0, "raise alone enqueues nothing");

    bus.pulse().await;
    wait_for_round(&mut rounds, 1).await;

    assert_eq!(handle.counters().events_sent(), 1, "round 1 flushes the pending event");
    assert!(!trigger.is_pending());
    let tx = bus.drain_tx();
    assert_eq!(tx.len(), 1);
    assert_eq!(Frame::parse(&tx[0]).unwrap().sender(), 28);

    // No duplicate on the following round
    bus.pulse().await;
    wait_for_round(&mut rounds, 2).await;
    assert_eq!(handle.counters().events_sent(), 1);
}

#[tokio::test]
async fn stimulus_under_backpressure_drops_softly() {
    init_tracing();
    let bus = Arc::new(LoopbackBus::with_tx_capacity(0));
    let handle = Coordinator::spawn(bus.clone(), Arc::new(NoopSwitch), AppConfig::new(28, 1))
        .expect("spawn reporter");
    let trigger = handle.trigger().expect("reporter has an event trigger");

    trigger.fire();

    assert_eq!(handle.counters().events_sent(), 0);
    assert_eq!(handle.counters().events_dropped(), 1);
    assert!(!trigger.is_pending(), "pending flag cleared after service");

    // The coordinator is still alive and keeps pacing rounds
    let mut rounds = handle.rounds();
    bus.pulse().await;
    wait_for_round(&mut rounds, 1).await;
}

#[tokio::test]
async fn sink_handle_has_no_trigger() {
    let bus = Arc::new(LoopbackBus::new());
    let handle = Coordinator::spawn(bus, Arc::new(NoopSwitch), AppConfig::new(28, 28))
        .expect("spawn sink");
    assert!(handle.trigger().is_none());
}

#[tokio::test]
async fn misconfigured_role_halts_before_the_loop() {
    let bus = Arc::new(LoopbackBus::new());
    let config = AppConfig::new(28, 28).initiators(vec![28]);
    let err = match Coordinator::spawn(bus.clone(), Arc::new(NoopSwitch), config) {
        Err(e) => e,
        Ok(_) => panic!("spawn must refuse an ambiguous role configuration"),
    };

    assert!(matches!(err, AppError::MisconfiguredRole { .. }));
    assert!(
        bus.registered_hint().is_none(),
        "bus must never be started on a fatal config"
    );
}

#[tokio::test]
async fn sleep_enabled_arms_switch_once_per_round() {
    init_tracing();
    let bus = Arc::new(LoopbackBus::new());
    let switch = CountingSwitch::new();
    let handle = Coordinator::spawn(bus.clone(), switch.clone(), AppConfig::new(28, 28))
        .expect("spawn sink");
    let mut rounds = handle.rounds();

    for expected in 1u16..=3 {
        bus.pulse().await;
        wait_for_round(&mut rounds, expected).await;
    }

    assert_eq!(switch.entries(), 3, "one low-power entry per suspend window");
}

#[tokio::test]
async fn sleep_disabled_never_touches_switch() {
    let bus = Arc::new(LoopbackBus::new());
    let switch = CountingSwitch::new();
    let config = AppConfig::new(28, 28).sleep_between_rounds(false);
    let handle = Coordinator::spawn(bus.clone(), switch.clone(), config).expect("spawn sink");
    let mut rounds = handle.rounds();

    bus.pulse().await;
    wait_for_round(&mut rounds, 1).await;

    assert_eq!(switch.entries(), 0);
}
