use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::AppError;

/// Hardware seam for the between-rounds low-power transition.
///
/// Implementations may stop timers, disable non-essential peripherals and
/// reconfigure pins, but must leave the clock source the bus scheduler
/// depends on running — the next poll notification has to arrive on time.
/// Reversal on wake is the platform's job, not this core's.
pub trait PowerSwitch: Send + Sync + 'static {
    fn enter_low_power(&self) -> Result<(), AppError>;
}

/// No-op switch for hosts without a hardware backend.
pub struct NoopSwitch;

impl PowerSwitch for NoopSwitch {
    fn enter_low_power(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// Applies the minimal-power configuration once per suspend window.
///
/// Idempotent: repeated `arm` calls without an intervening `on_wake` leave
/// the hardware exactly as a single call would. A failing switch is logged
/// and the armed state rolled back so a later call may retry; the round
/// loop never stops over it.
pub struct PowerManager {
    enabled: bool,
    switch: Arc<dyn PowerSwitch>,
    low_power: AtomicBool,
}

impl PowerManager {
    pub fn new(enabled: bool, switch: Arc<dyn PowerSwitch>) -> Self {
        Self {
            enabled,
            switch,
            low_power: AtomicBool::new(false),
        }
    }

    /// Manager that never touches the hardware.
    pub fn disabled() -> Self {
        Self::new(false, Arc::new(NoopSwitch))
    }

    /// Transition to the minimal-power configuration, if enabled and not
    /// already there.
    pub fn arm(&self) {
        if !self.enabled {
            return;
        }
        if self.low_power.swap(true, Ordering::AcqRel) {
            return; // already in low power, nothing to re-apply
        }
        if let Err(e) = self.switch.enter_low_power() {
            self.low_power.store(false, Ordering::Release);
            tracing::warn!(error = %e, "low-power transition failed");
        } else {
            tracing::debug!("low-power configuration armed");
        }
    }

    /// Note that the node woke for a round. Clears the armed state only;
    /// hardware reversal happens outside this core.
    pub fn on_wake(&self) {
        self.low_power.store(false, Ordering::Release);
    }

    pub fn is_low_power(&self) -> bool {
        self.low_power.load(Ordering::Acquire)
    }
}
