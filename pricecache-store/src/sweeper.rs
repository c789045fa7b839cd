//! Optional periodic reclamation of expired entries.
//!
//! The store only evicts lazily on read; a key that expires and is never read
//! again stays resident. The sweeper bounds that growth by purging on a timer.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::store::ExpiringStore;

/// Spawns a task that calls [`ExpiringStore::purge_expired`] every `interval`.
///
/// Runs until the returned handle is aborted. Must be called from within a
/// tokio runtime.
pub fn spawn_sweeper(store: Arc<ExpiringStore>, interval: Duration) -> JoinHandle<()> {
    info!(interval_ms = interval.as_millis() as u64, "Starting expired-entry sweeper");

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let purged = store.purge_expired();
            if purged > 0 {
                debug!(purged, remaining = store.len(), "Swept expired entries");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricecache_core::clock::ManualClock;

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_purges_unread_entries() {
        let clock = ManualClock::new();
        let store = Arc::new(ExpiringStore::with_clock(
            Duration::from_secs(1),
            Arc::new(clock.clone()),
        ));
        store.write("A", 1.0);
        store.write("B", 2.0);

        let handle = spawn_sweeper(store.clone(), Duration::from_millis(100));

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(store.len(), 2);

        clock.advance(Duration::from_secs(2));
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(store.is_empty());

        handle.abort();
    }
}
