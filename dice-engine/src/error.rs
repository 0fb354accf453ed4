//! Error types raised by the tray, the roll services and the roll action.
use thiserror::Error;

use crate::die::ConfigId;

/// Errors raised when a tray edit would violate configuration invariants.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no dice configuration with id {0}")]
    UnknownId(ConfigId),
    #[error("a die needs at least 2 sides (got {sides})")]
    TooFewSides { sides: u32 },
    #[error("a configuration must roll at least one die")]
    ZeroCount,
}

/// Failure reported by a roll service for a single request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// The service refused the request (limits, unknown die, ...).
    #[error("{0}")]
    Rejected(String),
    /// The service could not be reached or answered with garbage.
    #[error("roll service unavailable: {0}")]
    Unavailable(String),
}

impl ServiceError {
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}

/// Errors that abort a whole roll action.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RollError {
    #[error(transparent)]
    Request(#[from] ServiceError),
    #[error("no dice configured")]
    EmptyTray,
}

impl RollError {
    /// Single user-facing line describing the failed action.
    #[must_use]
    pub fn alert_message(&self) -> String {
        format!("Roll failed: {self}")
    }
}
