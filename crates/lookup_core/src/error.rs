//! Error types for lookup

use std::time::Duration;

use thiserror::Error;

/// Errors that can end a candidate fetch or reject a configuration
///
/// Cancellation is deliberately absent: an aborted request is a
/// [`RequestPhase`](crate::request::RequestPhase), not a failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// Transport-level failure (DNS, connect, TLS, reset, body read)
    #[error("Network error: {0}")]
    Network(String),

    /// The endpoint answered with a non-success status
    #[error("HTTP error: {0}")]
    Status(u16),

    /// The payload was not a list of candidate records
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The request did not finish within the configured timeout
    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl LookupError {
    /// Whether the failure came from the remote side rather than local setup
    pub fn is_fetch_failure(&self) -> bool {
        !matches!(self, LookupError::Config(_))
    }
}

/// Result type for lookup operations
pub type Result<T> = std::result::Result<T, LookupError>;
