//! The round coordinator — one cooperative task per node.
//!
//! `Coordinator::spawn` validates configuration, resolves the node's role,
//! registers with the bus and starts the round loop as a tokio task. The
//! returned handle is the application's only window into the running
//! coordinator: read-only counters, a watch on the round counter, and (for
//! reporters) the event trigger.

mod round;

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use rondo_bus::{BusService, Poll};

use crate::config::AppConfig;
use crate::counters::{AppCounters, CountersSnapshot};
use crate::error::AppError;
use crate::event::EventTrigger;
use crate::power::{PowerManager, PowerSwitch};
use crate::role::Role;

use round::{ReporterRound, RoundHandler, SinkRound};

/// Capacity of the poll notification channel. The bus delivers one poll
/// per round; a small buffer absorbs scheduling jitter without letting
/// rounds pile up unobserved.
const POLL_BUFFER: usize = 4;

/// The round coordinator — spawn it and observe it through the handle.
pub struct Coordinator;

impl Coordinator {
    /// Validate, resolve the role, register with the bus and start the
    /// round loop.
    ///
    /// A structurally invalid configuration ([`AppError::Config`],
    /// [`AppError::MisconfiguredRole`]) is fatal here, before the loop
    /// exists. The loop itself runs for the lifetime of the process and
    /// ends only when the bus drops its poll sender.
    pub fn spawn<B: BusService>(
        bus: Arc<B>,
        switch: Arc<dyn PowerSwitch>,
        config: AppConfig,
    ) -> Result<CoordinatorHandle<B>, AppError> {
        config.validate()?;
        let role = Role::resolve(&config)?;

        let (poll_tx, poll_rx) = mpsc::channel::<Poll>(POLL_BUFFER);
        bus.start(role.hint(), poll_tx)?;

        let counters = Arc::new(AppCounters::new());
        let power = PowerManager::new(config.sleep_between_rounds, switch);
        let (round_tx, round_rx) = watch::channel(0u16);

        let trigger = match role {
            Role::Reporter => Some(Arc::new(EventTrigger::new(
                bus.clone(),
                config.node_id,
                counters.clone(),
            ))),
            Role::Sink => None,
        };

        let handler: Box<dyn RoundHandler<B>> = match role {
            Role::Sink => Box::new(SinkRound::new(&config)),
            Role::Reporter => Box::new(ReporterRound::new(&config)),
        };

        tracing::info!(
            node = config.node_id,
            sink = config.sink_id,
            ?role,
            period = ?config.round_period,
            slot = ?config.slot_duration,
            sleep = config.sleep_between_rounds,
            "coordinator starting"
        );

        tokio::spawn(round::round_loop(
            bus,
            handler,
            trigger.clone(),
            counters.clone(),
            power,
            poll_rx,
            round_tx,
        ));

        Ok(CoordinatorHandle {
            role,
            counters,
            rounds: round_rx,
            trigger,
        })
    }
}

/// Handle to a running coordinator. Cheap to clone; every accessor is
/// read-only from the round loop's point of view.
pub struct CoordinatorHandle<B: BusService> {
    role: Role,
    counters: Arc<AppCounters>,
    rounds: watch::Receiver<u16>,
    trigger: Option<Arc<EventTrigger<B>>>,
}

impl<B: BusService> Clone for CoordinatorHandle<B> {
    fn clone(&self) -> Self {
        Self {
            role: self.role,
            counters: self.counters.clone(),
            rounds: self.rounds.clone(),
            trigger: self.trigger.clone(),
        }
    }
}

impl<B: BusService> CoordinatorHandle<B> {
    /// The role this node resolved to at startup. Never changes.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Live counters. Shared with the round loop and the event trigger.
    pub fn counters(&self) -> &AppCounters {
        &self.counters
    }

    /// Point-in-time copy of the counters.
    pub fn snapshot(&self) -> CountersSnapshot {
        self.counters.snapshot()
    }

    /// Watch the round counter. The value updates once per completed
    /// round, after the round's work and before the power transition.
    pub fn rounds(&self) -> watch::Receiver<u16> {
        self.rounds.clone()
    }

    /// The event source adapter — `Some` only for reporter nodes.
    pub fn trigger(&self) -> Option<&EventTrigger<B>> {
        self.trigger.as_deref()
    }
}
