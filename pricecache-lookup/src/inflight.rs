//! Per-key coalescing of concurrent upstream fetches.
//!
//! While a fetch for a key is outstanding, later misses on the same key await
//! that fetch instead of issuing their own. The fetch runs on its own task, so
//! it completes, writes the store and clears its slot even if every waiter is
//! dropped. A failure is delivered to every waiter without being remembered.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::{debug, warn};

use pricecache_core::error::{PriceCacheError, Result};
use pricecache_core::traits::PriceService;
use pricecache_store::ExpiringStore;

type SharedFetch = Shared<BoxFuture<'static, std::result::Result<f64, String>>>;

/// Table of outstanding fetches, keyed by item code.
#[derive(Default)]
pub(crate) struct InFlight {
    calls: Mutex<HashMap<String, (u64, SharedFetch)>>,
    next_id: AtomicU64,
}

impl InFlight {
    /// Awaits the outstanding fetch for `item_code`, starting one if none exists.
    pub(crate) async fn fetch(
        self: &Arc<Self>,
        item_code: &str,
        service: &Arc<dyn PriceService>,
        store: &Arc<ExpiringStore>,
    ) -> Result<f64> {
        let fetch = {
            let mut calls = self.calls.lock();
            match calls.get(item_code) {
                Some((_, pending)) => {
                    debug!(item_code, "Joining in-flight fetch");
                    pending.clone()
                }
                None => {
                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    let fetch = self.start(id, item_code, service.clone(), store.clone());
                    calls.insert(item_code.to_string(), (id, fetch.clone()));
                    fetch
                }
            }
        };

        fetch.await.map_err(|reason| {
            warn!(item_code, reason = %reason, "Upstream price lookup failed");
            PriceCacheError::upstream(item_code, reason)
        })
    }

    /// Spawns the upstream fetch and returns a shareable handle to its outcome.
    ///
    /// Called with the `calls` lock held, so the task cannot release its slot
    /// before the slot is inserted.
    fn start(
        self: &Arc<Self>,
        id: u64,
        item_code: &str,
        service: Arc<dyn PriceService>,
        store: Arc<ExpiringStore>,
    ) -> SharedFetch {
        let slot = SlotGuard {
            table: Arc::downgrade(self),
            key: item_code.to_string(),
            id,
        };

        let task = tokio::spawn(async move {
            let outcome = service
                .price_for(&slot.key)
                .await
                .map_err(|e| e.to_string());
            if let Ok(price) = outcome {
                store.write(&slot.key, price);
            }
            // Released only after the write; a panic releases through unwinding.
            drop(slot);
            outcome
        });

        async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(join_err) => Err(join_err.to_string()),
            }
        }
        .boxed()
        .shared()
    }

    fn release(&self, item_code: &str, id: u64) {
        let mut calls = self.calls.lock();
        if calls.get(item_code).is_some_and(|(current, _)| *current == id) {
            calls.remove(item_code);
        }
    }

    /// Returns the number of keys with an outstanding fetch.
    pub(crate) fn len(&self) -> usize {
        self.calls.lock().len()
    }
}

/// Clears a fetch's slot when the fetch task finishes.
struct SlotGuard {
    table: Weak<InFlight>,
    key: String,
    id: u64,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        if let Some(table) = self.table.upgrade() {
            table.release(&self.key, self.id);
        }
    }
}
