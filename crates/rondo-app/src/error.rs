/// Application-core errors.
///
/// Everything here is fatal at startup: once the round loop runs there is
/// no caller left to propagate to, and in-round failures are soft (logged
/// and counted, never raised).
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("bus error: {0}")]
    Bus(#[from] rondo_bus::BusError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("misconfigured role: {reason}")]
    MisconfiguredRole { reason: String },

    #[error("power switch failed: {0}")]
    Power(String),
}
