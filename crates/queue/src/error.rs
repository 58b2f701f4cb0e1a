//! Queue error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The alerts selected by a rule were already consumed by a prior
    /// completed attempt. The orchestrator reports this as EXISTS and
    /// moves on; it is an outcome, not a failure.
    #[error("alerts already delivered: {0}")]
    AlreadyDelivered(String),
}
