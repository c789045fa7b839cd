//! Read-through cache in front of a price service.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, instrument, warn};

use pricecache_core::clock::{Clock, SystemClock};
use pricecache_core::config::CacheConfig;
use pricecache_core::error::{PriceCacheError, Result};
use pricecache_core::traits::PriceService;
use pricecache_store::{spawn_sweeper, CacheStats, ExpiringStore};

use crate::inflight::InFlight;

/// Transparent cache wrapping a slow [`PriceService`].
///
/// Serves a price from the store while it is younger than `max_age`,
/// otherwise fetches it upstream and stores the result. Failures are never
/// stored.
///
/// Without `coalesce_in_flight`, concurrent misses on the same key each call
/// upstream and the last write wins.
///
/// Cloning is cheap; clones share the store and the upstream service.
#[derive(Clone)]
pub struct TransparentCache {
    service: Arc<dyn PriceService>,
    store: Arc<ExpiringStore>,
    in_flight: Option<Arc<InFlight>>,
    config: Arc<CacheConfig>,
}

impl TransparentCache {
    /// Creates a cache with the given config on the system clock.
    pub fn new(service: Arc<dyn PriceService>, config: CacheConfig) -> Result<Self> {
        Self::with_clock(service, config, Arc::new(SystemClock))
    }

    /// Creates a cache with only a max age set.
    pub fn with_max_age(service: Arc<dyn PriceService>, max_age: Duration) -> Result<Self> {
        Self::new(service, CacheConfig::with_max_age(max_age))
    }

    /// Creates a cache on a custom clock.
    pub fn with_clock(
        service: Arc<dyn PriceService>,
        config: CacheConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        let store = Arc::new(ExpiringStore::with_clock(config.max_age(), clock));
        let in_flight = config
            .coalesce_in_flight
            .then(|| Arc::new(InFlight::default()));

        Ok(Self {
            service,
            store,
            in_flight,
            config: Arc::new(config),
        })
    }

    /// Gets the price for an item, from the store or from upstream.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let cache = TransparentCache::with_max_age(service, Duration::from_secs(60))?;
    /// let price = cache.get_price_for("sku-42").await?;
    /// ```
    #[instrument(skip(self))]
    pub async fn get_price_for(&self, item_code: &str) -> Result<f64> {
        if let Some(price) = self.store.read(item_code) {
            debug!(item_code, "Cache hit");
            return Ok(price);
        }

        debug!(item_code, "Cache miss, fetching");

        match &self.in_flight {
            Some(in_flight) => in_flight.fetch(item_code, &self.service, &self.store).await,
            None => self.fetch_and_store(item_code).await,
        }
    }

    async fn fetch_and_store(&self, item_code: &str) -> Result<f64> {
        let price = self.service.price_for(item_code).await.map_err(|e| {
            warn!(item_code, error = %e, "Upstream price lookup failed");
            PriceCacheError::upstream(item_code, e)
        })?;

        self.store.write(item_code, price);
        Ok(price)
    }

    /// Gets prices for several items at once.
    ///
    /// Each position is resolved by its own task. The result keeps input
    /// order and length, repeats included. The first failure observed fails
    /// the whole call; remaining tasks are detached (or aborted with
    /// `cancel_on_error`) and their results discarded.
    #[instrument(skip(self, item_codes), fields(count = item_codes.len()))]
    pub async fn get_prices_for<S: AsRef<str>>(&self, item_codes: &[S]) -> Result<Vec<f64>> {
        let mut slots: Vec<Option<f64>> = vec![None; item_codes.len()];
        let mut tasks = JoinSet::new();

        for (idx, item_code) in item_codes.iter().enumerate() {
            let cache = self.clone();
            let item_code = item_code.as_ref().to_string();
            tasks.spawn(async move { (idx, cache.get_price_for(&item_code).await) });
        }

        while let Some(joined) = tasks.join_next().await {
            let failure = match joined {
                Ok((idx, Ok(price))) => {
                    slots[idx] = Some(price);
                    continue;
                }
                Ok((_, Err(err))) => err,
                Err(join_err) => PriceCacheError::TaskFailed(join_err.to_string()),
            };

            let outstanding = tasks.len();
            if self.config.cancel_on_error {
                tasks.abort_all();
            } else {
                tasks.detach_all();
            }
            warn!(error = %failure, outstanding, "Batch lookup failed");
            return Err(failure);
        }

        let prices = slots
            .into_iter()
            .collect::<Option<Vec<f64>>>()
            .ok_or_else(|| PriceCacheError::TaskFailed("batch ended with an empty slot".into()))?;

        info!(count = prices.len(), "Batch lookup complete");
        Ok(prices)
    }

    /// Starts the expired-entry sweeper if `sweep_interval_ms` is configured.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_sweeper(&self) -> Option<JoinHandle<()>> {
        self.config
            .sweep_interval()
            .map(|interval| spawn_sweeper(self.store.clone(), interval))
    }

    /// Drops the cached price for an item.
    pub fn invalidate(&self, item_code: &str) {
        self.store.remove(item_code);
    }

    /// Drops every cached price.
    pub fn clear(&self) {
        self.store.clear();
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &ExpiringStore {
        &self.store
    }

    /// Returns store statistics.
    pub fn stats(&self) -> CacheStats {
        self.store.stats()
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}
