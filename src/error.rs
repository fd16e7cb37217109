//! Error handling module for firstmate
//!
//! Provides centralized error types using thiserror. The transport-level
//! errors (`ConnectError`, `ExecError`) live next to the session contract in
//! `session.rs`; this module holds the crate-level error that callers see.

use thiserror::Error;

use crate::registry::RegistryError;
use crate::session::ConnectError;

/// Main error type for firstmate
#[derive(Error, Debug)]
pub enum FirstmateError {
    /// IO errors (settings file, terminal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings errors (loading, parsing)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors (target descriptor, settings values)
    #[error("Validation error: {0}")]
    Validation(String),

    /// The SSH session could not be established
    #[error("SSH connection failed: {0}")]
    Connection(#[from] ConnectError),

    /// Registry lookup miss
    #[error(transparent)]
    UnknownApplication(#[from] RegistryError),

    /// A run finished with failed steps and the caller treats that as fatal
    #[error("{operation} of {app} failed: {reason}")]
    RunFailed {
        app: String,
        operation: String,
        reason: String,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for firstmate operations
pub type Result<T> = std::result::Result<T, FirstmateError>;

impl FirstmateError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a run failure
    pub fn run_failed(
        app: impl Into<String>,
        operation: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::RunFailed {
            app: app.into(),
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}
