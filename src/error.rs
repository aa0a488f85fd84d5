use thiserror::Error;

/// Errors returned by the wheel, its handle and the global façade.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WheelError {
    /// The tick interval was zero.
    #[error("tick interval must be greater than zero")]
    InvalidTickInterval,

    /// The slot count was zero.
    #[error("slot count must be greater than zero")]
    InvalidSlotCount,

    /// The command buffer size was zero.
    #[error("command buffer size must be greater than zero")]
    InvalidCommandBufferSize,

    /// A job was submitted with an empty key.
    #[error("job key must not be empty")]
    EmptyKey,

    /// The wheel has been stopped and no longer accepts commands.
    #[error("time wheel is closed")]
    Closed,

    /// The command buffer is full (non-blocking operations only).
    #[error("command channel is full")]
    Full,

    /// The global wheel has not been started yet.
    #[error("global time wheel has not been started")]
    NotStarted,

    /// The global wheel was already started.
    #[error("global time wheel is already started")]
    AlreadyStarted,
}
