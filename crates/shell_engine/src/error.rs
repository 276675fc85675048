use thiserror::Error;

use crate::PersistError;

/// Persistence failures. Every variant is recoverable: callers fall back to
/// in-memory defaults.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store cannot be reached at all.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store file {path} is corrupt: {reason}")]
    Corrupt { path: String, reason: String },
    #[error(transparent)]
    Persist(#[from] PersistError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriptionError {
    #[error("failed to subscribe to {topic}: {reason}")]
    SetupFailed { topic: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The host rejected the call; the text is the host's own message.
    #[error("{0}")]
    Failed(String),
    #[error("unknown command {0}")]
    UnknownCommand(String),
    #[error("invalid arguments for {command}: {reason}")]
    InvalidArgs { command: String, reason: String },
    #[error("event channel closed")]
    ChannelClosed,
    #[error("host process unavailable")]
    HostUnavailable,
}
