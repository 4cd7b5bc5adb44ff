//! Common error types for mcprobe components.

use std::fmt;

/// A specialized Result type for probe operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for probe operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot connect to [{endpoint}]: {reason}")]
    Connect { endpoint: String, reason: String },

    #[error("{0}")]
    Transport(String),

    #[error("{operation} timed out after {elapsed_ms}ms")]
    Timeout {
        operation: &'static str,
        elapsed_ms: u128,
    },

    #[error("protocol mismatch: {0}")]
    Protocol(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new connect error.
    pub fn connect(endpoint: impl fmt::Display, reason: impl fmt::Display) -> Self {
        Error::Connect {
            endpoint: endpoint.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a new transport error.
    pub fn transport(msg: impl fmt::Display) -> Self {
        Error::Transport(msg.to_string())
    }

    /// Create a new timeout error.
    pub fn timeout(operation: &'static str, elapsed: std::time::Duration) -> Self {
        Error::Timeout {
            operation,
            elapsed_ms: elapsed.as_millis(),
        }
    }

    /// Create a new protocol mismatch error.
    pub fn protocol(msg: impl fmt::Display) -> Self {
        Error::Protocol(msg.to_string())
    }

    /// True for failures of the network layer (connect, read, write, timeout).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Connect { .. } | Error::Transport(_) | Error::Timeout { .. }
        )
    }
}
