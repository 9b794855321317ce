//! Rondo bus boundary.
//!
//! The bus service is a time-synchronized, round-scheduled transport owned
//! by an external scheduler. This crate defines the seam the application
//! core talks through: the fixed wire [`Frame`] layout, the [`BusService`]
//! accessor trait, and an in-memory [`LoopbackBus`] for tests and
//! simulations.

pub mod error;
pub mod frame;
pub mod loopback;
pub mod service;

pub use error::BusError;
pub use frame::{Frame, ID_PREFIX_LEN, MAX_FRAME_LEN};
pub use loopback::LoopbackBus;
pub use service::{BusService, Poll, RoleHint};
