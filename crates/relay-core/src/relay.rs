//! The mailbox relay service
//!
//! An explicitly owned service instance rather than a module-level global,
//! so callers decide its lifetime and tests can construct isolated relays
//! with a simulated clock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use lingua_infra_common::time::{Clock, SystemClock};
use tracing::{debug, warn};

use crate::config::RelayConfig;
use crate::error::{RelayError, Result};
use crate::types::{Mailbox, Message, UserId};

/// Aggregate statistics about a relay instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayStats {
    /// Number of mailboxes currently held
    pub active_mailboxes: usize,
    /// Total messages pending across all mailboxes
    pub pending_messages: usize,
    /// Messages accepted since the relay was created
    pub total_sent: u64,
    /// Messages dropped because a mailbox was at capacity
    pub total_dropped: u64,
    /// Mailboxes removed by the sweep
    pub total_evicted: u64,
    /// Poll calls served
    pub total_polls: u64,
}

/// Process-wide registry of per-user signaling mailboxes
///
/// All operations are synchronous and in-memory. The map supports
/// concurrent `send`/`poll`/`sweep`; each mailbox is mutated under its own
/// map-entry lock, so a drain never observes a half-appended queue.
///
/// Delivery is at-most-once and best-effort; see the crate docs for the
/// loss conditions.
pub struct MailboxRelay {
    mailboxes: DashMap<UserId, Mailbox>,
    config: RelayConfig,
    clock: Arc<dyn Clock>,
    total_sent: AtomicU64,
    total_dropped: AtomicU64,
    total_evicted: AtomicU64,
    total_polls: AtomicU64,
}

impl MailboxRelay {
    /// Create a relay backed by the system clock
    pub fn new(config: RelayConfig) -> Arc<Self> {
        Self::with_clock(config, SystemClock::new())
    }

    /// Create a relay with an injected clock (used by tests to drive the
    /// idle-eviction logic deterministically)
    pub fn with_clock(config: RelayConfig, clock: Arc<dyn Clock>) -> Arc<Self> {
        Arc::new(MailboxRelay {
            mailboxes: DashMap::new(),
            config,
            clock,
            total_sent: AtomicU64::new(0),
            total_dropped: AtomicU64::new(0),
            total_evicted: AtomicU64::new(0),
            total_polls: AtomicU64::new(0),
        })
    }

    /// Ensure a mailbox exists for `user` and refresh its last-seen time
    ///
    /// Idempotent; a registration after eviction is indistinguishable from
    /// a first registration.
    pub fn register(&self, user: UserId) {
        let now = self.clock.now();
        self.mailboxes
            .entry(user)
            .and_modify(|mailbox| mailbox.last_poll = now)
            .or_insert_with(|| {
                debug!("Created mailbox for {}", user);
                Mailbox::new(now)
            });
    }

    /// Append a message to the recipient's mailbox
    ///
    /// Lazily creates the recipient's mailbox if absent. Once the mailbox
    /// is at capacity the oldest pending message is dropped to admit the
    /// new one; the sender is not told. Fails only when the message type
    /// tag is empty.
    pub fn send(
        &self,
        from: UserId,
        to: UserId,
        msg_type: &str,
        payload: serde_json::Value,
    ) -> Result<()> {
        if msg_type.trim().is_empty() {
            return Err(RelayError::invalid_request("message type must not be empty"));
        }

        let message = Message {
            msg_type: msg_type.to_string(),
            from,
            payload,
        };

        let now = self.clock.now();
        let mut mailbox = self
            .mailboxes
            .entry(to)
            .or_insert_with(|| Mailbox::new(now));

        mailbox.pending.push_back(message);
        if mailbox.pending.len() > self.config.mailbox_capacity {
            mailbox.pending.pop_front();
            self.total_dropped.fetch_add(1, Ordering::Relaxed);
            warn!(
                "Mailbox for {} at capacity ({}), dropped oldest pending message",
                to, self.config.mailbox_capacity
            );
        }
        drop(mailbox);

        self.total_sent.fetch_add(1, Ordering::Relaxed);
        debug!("Queued '{}' message {} -> {}", msg_type, from, to);
        Ok(())
    }

    /// Drain and return all pending messages for `user`
    ///
    /// Atomically swaps the queue for an empty one and refreshes the
    /// mailbox's last-seen time. A poll from a user with no mailbox acts
    /// as an implicit [`register`](Self::register): a polling client is by
    /// definition online, so the entry is created rather than left for
    /// the next explicit registration. Returns messages in FIFO arrival
    /// order; an empty vec when nothing is pending. Drained messages are
    /// consumed exactly once and never replayed.
    pub fn poll(&self, user: UserId) -> Vec<Message> {
        self.total_polls.fetch_add(1, Ordering::Relaxed);

        let now = self.clock.now();
        let mut mailbox = self
            .mailboxes
            .entry(user)
            .or_insert_with(|| Mailbox::new(now));
        mailbox.last_poll = now;

        let drained: Vec<Message> = std::mem::take(&mut mailbox.pending).into();
        drop(mailbox);

        if !drained.is_empty() {
            debug!("Delivered {} pending message(s) to {}", drained.len(), user);
        }
        drained
    }

    /// Remove mailboxes whose owner has not polled within the idle
    /// threshold
    ///
    /// Reclaims memory for clients that disconnected without cleaning up.
    /// Anything still pending in an evicted mailbox is discarded. Returns
    /// the number of mailboxes removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let threshold = chrono::Duration::from_std(self.config.idle_threshold)
            .unwrap_or_else(|_| chrono::Duration::seconds(300));

        let mut evicted = 0usize;
        self.mailboxes.retain(|user, mailbox| {
            let idle = now - mailbox.last_poll;
            if idle > threshold {
                debug!(
                    "Evicting idle mailbox for {} ({} message(s) discarded)",
                    user,
                    mailbox.pending.len()
                );
                evicted += 1;
                false
            } else {
                true
            }
        });

        if evicted > 0 {
            self.total_evicted.fetch_add(evicted as u64, Ordering::Relaxed);
            warn!("Sweep evicted {} idle mailbox(es)", evicted);
        }
        evicted
    }

    /// Whether a mailbox currently exists for `user`
    pub fn is_registered(&self, user: UserId) -> bool {
        self.mailboxes.contains_key(&user)
    }

    /// Number of messages pending for `user` (zero if unregistered)
    pub fn mailbox_len(&self, user: UserId) -> usize {
        self.mailboxes
            .get(&user)
            .map(|mailbox| mailbox.pending.len())
            .unwrap_or(0)
    }

    /// Snapshot of relay statistics
    pub fn stats(&self) -> RelayStats {
        let pending_messages = self
            .mailboxes
            .iter()
            .map(|entry| entry.pending.len())
            .sum();
        RelayStats {
            active_mailboxes: self.mailboxes.len(),
            pending_messages,
            total_sent: self.total_sent.load(Ordering::Relaxed),
            total_dropped: self.total_dropped.load(Ordering::Relaxed),
            total_evicted: self.total_evicted.load(Ordering::Relaxed),
            total_polls: self.total_polls.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn config(&self) -> &RelayConfig {
        &self.config
    }
}

impl std::fmt::Debug for MailboxRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailboxRelay")
            .field("active_mailboxes", &self.mailboxes.len())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use lingua_infra_common::time::ManualClock;
    use serde_json::json;

    fn test_relay() -> (Arc<MailboxRelay>, Arc<ManualClock>) {
        let clock = ManualClock::new();
        let relay = MailboxRelay::with_clock(RelayConfig::default(), clock.clone());
        (relay, clock)
    }

    #[test]
    fn poll_returns_sends_in_fifo_order_then_empty() {
        let (relay, _clock) = test_relay();
        let alice = UserId(1);
        let bob = UserId(2);

        relay.register(bob);
        for i in 0..5 {
            relay
                .send(alice, bob, "chat", json!({ "seq": i }))
                .unwrap();
        }

        let drained = relay.poll(bob);
        assert_eq!(drained.len(), 5);
        for (i, msg) in drained.iter().enumerate() {
            assert_eq!(msg.from, alice);
            assert_eq!(msg.payload["seq"], i);
        }

        // Exactly-once: nothing is replayed on the next poll.
        assert!(relay.poll(bob).is_empty());
    }

    #[test]
    fn send_with_empty_type_is_invalid_request() {
        let (relay, _clock) = test_relay();
        let err = relay
            .send(UserId(1), UserId(2), "  ", json!({}))
            .unwrap_err();
        assert!(matches!(err, RelayError::InvalidRequest { .. }));
        assert_eq!(relay.mailbox_len(UserId(2)), 0);
    }

    #[test]
    fn send_lazily_creates_recipient_mailbox() {
        let (relay, _clock) = test_relay();
        let bob = UserId(2);
        assert!(!relay.is_registered(bob));

        relay.send(UserId(1), bob, "invite", json!({})).unwrap();
        assert!(relay.is_registered(bob));
        assert_eq!(relay.mailbox_len(bob), 1);
    }

    #[test]
    fn overflow_drops_oldest_first() {
        let clock = ManualClock::new();
        let relay = MailboxRelay::with_clock(
            RelayConfig::default().with_mailbox_capacity(100),
            clock,
        );
        let bob = UserId(2);

        for i in 0..130 {
            relay
                .send(UserId(1), bob, "chat", json!({ "seq": i }))
                .unwrap();
        }

        assert_eq!(relay.mailbox_len(bob), 100);
        let drained = relay.poll(bob);
        assert_eq!(drained.len(), 100);
        // The oldest 30 were dropped; the newest 100 survive in order.
        assert_eq!(drained[0].payload["seq"], 30);
        assert_eq!(drained[99].payload["seq"], 129);
        assert_eq!(relay.stats().total_dropped, 30);
    }

    #[test]
    fn sweep_evicts_only_idle_mailboxes() {
        let (relay, clock) = test_relay();
        let idle_user = UserId(1);
        let live_user = UserId(2);

        relay.register(idle_user);
        relay.register(live_user);

        clock.advance(ChronoDuration::seconds(301));
        relay.poll(live_user); // refreshes last_poll

        let evicted = relay.sweep();
        assert_eq!(evicted, 1);
        assert!(!relay.is_registered(idle_user));
        assert!(relay.is_registered(live_user));
    }

    #[test]
    fn idle_at_exactly_threshold_survives_sweep() {
        let (relay, clock) = test_relay();
        relay.register(UserId(1));
        clock.advance(ChronoDuration::seconds(300));
        assert_eq!(relay.sweep(), 0);
        assert!(relay.is_registered(UserId(1)));
    }

    #[test]
    fn register_or_send_recreates_after_eviction() {
        let (relay, clock) = test_relay();
        let bob = UserId(2);

        relay.register(bob);
        clock.advance(ChronoDuration::seconds(600));
        assert_eq!(relay.sweep(), 1);
        assert!(!relay.is_registered(bob));

        relay.register(bob);
        assert!(relay.is_registered(bob));

        clock.advance(ChronoDuration::seconds(600));
        relay.sweep();
        relay.send(UserId(1), bob, "invite", json!({})).unwrap();
        assert!(relay.is_registered(bob));
        assert_eq!(relay.mailbox_len(bob), 1);
    }

    #[test]
    fn sweep_discards_pending_messages_of_evicted_mailbox() {
        let (relay, clock) = test_relay();
        let bob = UserId(2);

        relay.send(UserId(1), bob, "invite", json!({})).unwrap();
        clock.advance(ChronoDuration::seconds(301));
        assert_eq!(relay.sweep(), 1);

        // Recreated empty: the pending invite is gone.
        relay.register(bob);
        assert!(relay.poll(bob).is_empty());
    }

    #[test]
    fn register_is_idempotent_and_refreshes_last_seen() {
        let (relay, clock) = test_relay();
        let bob = UserId(2);

        relay.register(bob);
        clock.advance(ChronoDuration::seconds(200));
        relay.register(bob);
        clock.advance(ChronoDuration::seconds(200));

        // 400s since creation but only 200s since the refresh.
        assert_eq!(relay.sweep(), 0);
        assert!(relay.is_registered(bob));
    }

    #[test]
    fn messages_from_multiple_senders_keep_arrival_order() {
        let (relay, _clock) = test_relay();
        let bob = UserId(9);

        relay.send(UserId(1), bob, "chat", json!({ "n": 1 })).unwrap();
        relay.send(UserId(2), bob, "chat", json!({ "n": 2 })).unwrap();
        relay.send(UserId(1), bob, "chat", json!({ "n": 3 })).unwrap();

        let drained = relay.poll(bob);
        let order: Vec<i64> = drained
            .iter()
            .map(|m| m.payload["n"].as_i64().unwrap())
            .collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn stats_track_relay_activity() {
        let (relay, clock) = test_relay();
        let bob = UserId(2);

        relay.send(UserId(1), bob, "invite", json!({})).unwrap();
        relay.poll(bob);
        relay.register(UserId(3));
        clock.advance(ChronoDuration::seconds(400));
        relay.sweep();

        let stats = relay.stats();
        assert_eq!(stats.total_sent, 1);
        assert_eq!(stats.total_polls, 1);
        assert_eq!(stats.total_evicted, 2);
        assert_eq!(stats.active_mailboxes, 0);
        assert_eq!(stats.pending_messages, 0);
    }

    #[test]
    fn poll_on_unknown_user_registers_and_returns_empty() {
        let (relay, _clock) = test_relay();
        assert!(relay.poll(UserId(7)).is_empty());
        assert!(relay.is_registered(UserId(7)));
    }
}
