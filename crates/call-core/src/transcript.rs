//! Per-call conversation transcript
//!
//! Append-only for the lifetime of one call session and cleared when the
//! session ends. Both parties keep their own local transcript; nothing is
//! synchronized beyond what flows through the translation and relay
//! collaborators.

use chrono::{DateTime, Utc};
use lingua_relay_core::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One utterance in the call transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Unique entry id
    pub id: Uuid,
    /// Who said (or typed) it
    pub sender: UserId,
    /// The utterance as captured
    pub original_text: String,
    /// The translated rendering, when translation ran
    pub translated_text: Option<String>,
    /// When the entry was appended
    pub timestamp: DateTime<Utc>,
}

impl TranscriptEntry {
    pub fn new(
        sender: UserId,
        original_text: impl Into<String>,
        translated_text: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        TranscriptEntry {
            id: Uuid::new_v4(),
            sender,
            original_text: original_text.into(),
            translated_text,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_get_distinct_ids() {
        let now = Utc::now();
        let a = TranscriptEntry::new(UserId(1), "hello", None, now);
        let b = TranscriptEntry::new(UserId(1), "hello", None, now);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn entry_round_trips_through_json() {
        let entry = TranscriptEntry::new(
            UserId(4),
            "bonjour",
            Some("hello".to_string()),
            Utc::now(),
        );
        let json = serde_json::to_string(&entry).unwrap();
        let back: TranscriptEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
