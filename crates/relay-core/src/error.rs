//! Error types for relay operations
//!
//! Relay operations are local and in-memory; the only failure mode is a
//! malformed request. Message loss under capacity pressure or idle
//! eviction is intentional and is not reported as an error.

use thiserror::Error;

/// Result type for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;

/// Errors produced by the mailbox relay
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// The caller supplied a malformed request (e.g. an empty message
    /// type). Non-retryable; the caller must fix the request.
    #[error("Invalid request: {reason}")]
    InvalidRequest {
        /// What was wrong with the request
        reason: String,
    },
}

impl RelayError {
    /// Convenience constructor for invalid-request errors
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        RelayError::InvalidRequest {
            reason: reason.into(),
        }
    }
}
