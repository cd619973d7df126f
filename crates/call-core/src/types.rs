//! Core call session types

use chrono::{DateTime, Utc};
use lingua_relay_core::UserId;
use serde::{Deserialize, Serialize};

/// Call session identifier
///
/// Time-based uniqueness plus a random suffix; collisions are negligible
/// at human call rates. Doubles as the RTC channel name.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generate a fresh id for a call started at `now`
    pub fn generate(now: DateTime<Utc>) -> Self {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        SessionId(format!("call-{}-{}", now.timestamp_millis(), &suffix[..8]))
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Phase of the call lifecycle state machine
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum CallPhase {
    /// No active call
    Idle,
    /// A call was initiated or accepted; waiting for the remote party's
    /// media to start flowing
    Calling,
    /// The remote participant's media is flowing; the duration counter
    /// runs in this phase
    Connected,
    /// Torn down by an explicit end, a remote-left notification, or a
    /// fatal RTC error; transient before the reset to `Idle`
    Ended,
}

impl CallPhase {
    /// Whether a call attempt is underway (transcript appends are legal)
    pub fn is_in_call(&self) -> bool {
        matches!(self, CallPhase::Calling | CallPhase::Connected)
    }
}

/// Snapshot of one call session
///
/// Owned by the initiating client for its own lifecycle; the remote party
/// holds an independent mirror for symmetry. Scoped to a single call
/// attempt, unlike the relay mailbox which persists across calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSessionState {
    /// Session identifier, also used as the RTC channel name
    pub session_id: SessionId,
    /// The local party
    pub local_user: UserId,
    /// The remote party, once known
    pub remote_user: Option<UserId>,
    /// Language the initiator speaks
    pub initiator_language: String,
    /// Language the receiver speaks
    pub receiver_language: String,
    /// Current lifecycle phase
    pub phase: CallPhase,
    /// When the remote media started flowing (set on entering `Connected`)
    pub connected_at: Option<DateTime<Utc>>,
    /// Seconds spent in `Connected`, updated by the duration counter
    pub elapsed_seconds: u64,
}

impl CallSessionState {
    /// An idle session slot for `local_user`
    pub fn idle(local_user: UserId) -> Self {
        CallSessionState {
            session_id: SessionId("idle".to_string()),
            local_user,
            remote_user: None,
            initiator_language: String::new(),
            receiver_language: String::new(),
            phase: CallPhase::Idle,
            connected_at: None,
            elapsed_seconds: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_session_ids_are_unique() {
        let now = Utc::now();
        let a = SessionId::generate(now);
        let b = SessionId::generate(now);
        assert_ne!(a, b);
        assert!(a.0.starts_with("call-"));
    }

    #[test]
    fn phase_in_call_classification() {
        assert!(!CallPhase::Idle.is_in_call());
        assert!(CallPhase::Calling.is_in_call());
        assert!(CallPhase::Connected.is_in_call());
        assert!(!CallPhase::Ended.is_in_call());
    }

    #[test]
    fn idle_session_starts_with_no_remote() {
        let session = CallSessionState::idle(UserId(1));
        assert_eq!(session.phase, CallPhase::Idle);
        assert!(session.remote_user.is_none());
        assert_eq!(session.elapsed_seconds, 0);
    }
}
