//! Round-scheduled application coordinator.
//!
//! Runs atop an external time-synchronized bus that grants the application
//! one slot per communication round. Each node holds a fixed role for its
//! lifetime: the sink aggregates frames from every other node; reporters
//! originate event frames and watch for their own identity coming back as
//! an acknowledgment. Between rounds the node drops into a minimal-power
//! hardware configuration.
//!
//! The coordinator is a single cooperative task — woken once per round by
//! the bus's poll notification, it runs its bounded round-slice, updates
//! its counters, arms the power state manager, and suspends again. The
//! only other actor is the event source adapter, which may interrupt the
//! round-slice at any point but performs exactly one non-blocking enqueue.

pub mod config;
pub mod coordinator;
pub mod counters;
pub mod error;
pub mod event;
pub mod power;
pub mod role;

pub use config::AppConfig;
pub use coordinator::{Coordinator, CoordinatorHandle};
pub use counters::{AppCounters, CountersSnapshot};
pub use error::AppError;
pub use event::EventTrigger;
pub use power::{NoopSwitch, PowerManager, PowerSwitch};
pub use role::Role;
