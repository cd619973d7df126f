//! Relay configuration

use std::time::Duration;

/// Configuration for the mailbox relay
///
/// The defaults match the intended deployment: mailboxes hold at most 100
/// pending messages, clients are considered gone after 5 minutes without a
/// poll, and the background sweep runs once a minute.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Maximum number of pending messages per mailbox; the oldest message
    /// is dropped first once this is exceeded
    pub mailbox_capacity: usize,
    /// How long a mailbox may go without a poll before the sweep removes it
    pub idle_threshold: Duration,
    /// Interval between background sweep passes
    pub sweep_interval: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        RelayConfig {
            mailbox_capacity: 100,
            idle_threshold: Duration::from_secs(300),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl RelayConfig {
    /// Override the per-mailbox capacity
    pub fn with_mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = capacity;
        self
    }

    /// Override the idle threshold used by the sweep
    pub fn with_idle_threshold(mut self, threshold: Duration) -> Self {
        self.idle_threshold = threshold;
        self
    }

    /// Override the sweep interval
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }
}
