//! LinguaCall core stack
//!
//! Single entry point re-exporting the member crates:
//!
//! - [`relay`] - the polling-based signaling mailbox relay
//! - [`call`] - the call session controller and collaborator seams
//! - [`infra`] - logging setup and the injectable clock
//!
//! Applications that want one dependency can use these re-exports;
//! the member crates remain usable individually.
//!
//! ```rust
//! use lingua::{MailboxRelay, RelayConfig, UserId};
//! use serde_json::json;
//!
//! let relay = MailboxRelay::new(RelayConfig::default());
//! relay.send(UserId(1), UserId(2), "invite", json!({ "channel": "c1" })).unwrap();
//! assert_eq!(relay.poll(UserId(2)).len(), 1);
//! ```

/// Signaling mailbox relay
pub mod relay {
    pub use lingua_relay_core::*;
}

/// Call session lifecycle
pub mod call {
    pub use lingua_call_core::*;
}

/// Shared infrastructure
pub mod infra {
    pub use lingua_infra_common::*;
}

// Most-used types at the crate root.
pub use lingua_call_core::{
    CallConfig, CallController, CallError, CallEvent, CallPhase, RtcEvent, RtcProvider,
    SessionId, TranscriptEntry,
};
pub use lingua_infra_common::{setup_logging, LoggingConfig};
pub use lingua_relay_core::{MailboxRelay, Message, RelayConfig, RelayError, UserId};
