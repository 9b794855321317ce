/// Errors returned by the bus boundary.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("frame too short: {len} bytes (sender id prefix needs {min})")]
    FrameTooShort { len: usize, min: usize },

    #[error("frame too large: {len} bytes (max {max})")]
    FrameTooLarge { len: usize, max: usize },

    #[error("poll target already registered")]
    AlreadyStarted,

    #[error("bus not started")]
    NotStarted,
}
