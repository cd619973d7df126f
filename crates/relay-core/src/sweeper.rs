//! Background eviction sweep
//!
//! Runs [`MailboxRelay::sweep`] on a fixed interval until the shutdown
//! signal fires. The interval comes from the relay's own configuration so
//! a relay and its sweeper cannot disagree.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::relay::MailboxRelay;

/// Spawn the periodic eviction sweep for `relay`
///
/// The task stops when `true` is sent on the shutdown channel (or the
/// sender is dropped). The first tick fires after one full interval, not
/// immediately.
pub fn spawn_sweeper(
    relay: Arc<MailboxRelay>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let interval = relay.config().sweep_interval;
    tokio::spawn(async move {
        info!("Mailbox sweeper started (interval {:?})", interval);
        let mut ticker = tokio::time::interval(interval);
        // Consume the immediate first tick so sweeps start one interval in.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let evicted = relay.sweep();
                    if evicted > 0 {
                        debug!("Sweep pass evicted {} mailbox(es)", evicted);
                    }
                }
                changed = shutdown.changed() => {
                    let stop = changed.is_err() || *shutdown.borrow();
                    if stop {
                        info!("Mailbox sweeper shutting down");
                        break;
                    }
                }
            }
        }
    })
}
