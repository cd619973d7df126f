//! Typed events in and out of the call controller
//!
//! Inbound, the RTC provider's callback surface is flattened into
//! [`RtcEvent`] so the state machine transition table can be unit-tested
//! without a real media stack. Outbound, the controller broadcasts
//! [`CallEvent`] notifications that presentation layers subscribe to
//! instead of polling.

use lingua_relay_core::UserId;
use serde::{Deserialize, Serialize};

use crate::transcript::TranscriptEntry;
use crate::types::CallPhase;

/// Events reported by the RTC collaborator
#[derive(Debug, Clone, PartialEq)]
pub enum RtcEvent {
    /// The remote participant joined and its media is flowing
    RemoteJoined {
        /// The remote party, when the provider can identify it
        remote_user: Option<UserId>,
    },
    /// The remote participant left the channel
    RemoteLeft,
    /// An unrecoverable provider error; the session cannot continue
    Fatal {
        /// Provider-supplied description
        reason: String,
    },
}

/// Notifications broadcast by the call controller
///
/// Delivered over a `tokio::sync::broadcast` channel; a lagging subscriber
/// may miss events, which is acceptable for presentation updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CallEvent {
    /// The session moved to a new lifecycle phase
    StateChanged {
        previous: CallPhase,
        current: CallPhase,
    },
    /// An utterance was appended to the transcript
    TranscriptUpdated { entry: TranscriptEntry },
    /// One second of connected call time elapsed
    DurationTick { elapsed_seconds: u64 },
    /// A collaborator failure was surfaced to the user
    CallFailed { message: String },
}
