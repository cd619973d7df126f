//! Core data types for the mailbox relay

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// User identifier
///
/// Integer key assigned by the excluded storage layer; the relay treats it
/// as opaque.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "user-{}", self.0)
    }
}

/// A signaling message pending in a recipient's mailbox
///
/// Ephemeral: exists only between send and the recipient's next poll.
/// There is no acknowledgment and no redelivery after a successful poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Application-level tag (e.g. `"invite"`, `"decline"`)
    #[serde(rename = "type")]
    pub msg_type: String,
    /// Who sent the message
    pub from: UserId,
    /// Opaque structured payload, passed through untouched
    pub payload: serde_json::Value,
}

/// One user's mailbox entry
///
/// Created lazily on first registration, first inbound send, or first
/// poll; removed by the sweep once `last_poll` falls behind the idle
/// threshold.
#[derive(Debug)]
pub(crate) struct Mailbox {
    /// When the owner last registered or polled
    pub last_poll: DateTime<Utc>,
    /// Pending messages in arrival order, oldest first
    pub pending: VecDeque<Message>,
}

impl Mailbox {
    pub(crate) fn new(now: DateTime<Utc>) -> Self {
        Mailbox {
            last_poll: now,
            pending: VecDeque::new(),
        }
    }
}
