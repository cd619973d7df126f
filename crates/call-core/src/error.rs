//! Error types for call session operations
//!
//! Collaborator failures are surfaced to the caller as user-visible errors
//! and move the session back to idle; there is no automatic retry or
//! reconnection at this layer. A reconnection, if wanted, is an explicit
//! new `start()` by the user.

use thiserror::Error;

use crate::types::CallPhase;

/// Result type for call session operations
pub type Result<T> = std::result::Result<T, CallError>;

/// Errors produced by the call session controller and its collaborators
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// Camera or microphone unavailable or permission denied
    #[error("Media access failed: {reason}")]
    MediaAccess { reason: String },

    /// Join credential / token retrieval from the RTC provider failed
    #[error("Signaling failed: {reason}")]
    Signaling { reason: String },

    /// Upstream translation service failure or timeout
    #[error("Translation failed: {reason}")]
    Translation { reason: String },

    /// Upstream transcription service failure or timeout
    #[error("Transcription failed: {reason}")]
    Transcription { reason: String },

    /// An operation was invoked outside its legal call phase
    #[error("Operation '{operation}' is not valid while the call is {phase:?}")]
    InvalidState {
        operation: String,
        phase: CallPhase,
    },
}

impl CallError {
    pub fn media_access(reason: impl Into<String>) -> Self {
        CallError::MediaAccess {
            reason: reason.into(),
        }
    }

    pub fn signaling(reason: impl Into<String>) -> Self {
        CallError::Signaling {
            reason: reason.into(),
        }
    }

    pub fn translation(reason: impl Into<String>) -> Self {
        CallError::Translation {
            reason: reason.into(),
        }
    }

    pub fn transcription(reason: impl Into<String>) -> Self {
        CallError::Transcription {
            reason: reason.into(),
        }
    }

    pub fn invalid_state(operation: impl Into<String>, phase: CallPhase) -> Self {
        CallError::InvalidState {
            operation: operation.into(),
            phase,
        }
    }
}
