//! Polling-based signaling relay for LinguaCall
//!
//! This crate implements the mailbox relay: a process-wide registry mapping
//! each active user to a bounded queue of pending signaling messages and a
//! last-seen timestamp. Clients without a persistent connection exchange
//! short messages (call invitations, accept/decline notices) by polling
//! their mailbox on an interval.
//!
//! # Delivery guarantees
//!
//! This is a best-effort, lossy channel, not a durable log:
//!
//! - Messages are consumed exactly once by the next [`MailboxRelay::poll`]
//!   and never replayed.
//! - Each mailbox is capacity-bounded; once full, the oldest pending
//!   message is silently dropped to admit the newest.
//! - Mailboxes that have not polled within the idle threshold are removed
//!   by the background sweep, discarding anything still pending.
//!
//! Per-recipient ordering is FIFO in arrival order at the relay; no
//! ordering is guaranteed across senders beyond that.
//!
//! # Usage
//!
//! ```rust
//! use lingua_relay_core::{MailboxRelay, RelayConfig, UserId};
//! use serde_json::json;
//!
//! let relay = MailboxRelay::new(RelayConfig::default());
//! let alice = UserId(1);
//! let bob = UserId(2);
//!
//! relay.register(bob);
//! relay.send(alice, bob, "invite", json!({ "channel": "call-123" })).unwrap();
//!
//! let pending = relay.poll(bob);
//! assert_eq!(pending.len(), 1);
//! assert_eq!(pending[0].msg_type, "invite");
//! assert!(relay.poll(bob).is_empty());
//! ```

pub mod config;
pub mod error;
pub mod relay;
pub mod sweeper;
pub mod types;

pub use config::RelayConfig;
pub use error::{RelayError, Result};
pub use relay::{MailboxRelay, RelayStats};
pub use sweeper::spawn_sweeper;
pub use types::{Message, UserId};
