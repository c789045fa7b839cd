//! Scripted price service for tests, demos and benchmarks.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use pricecache_core::traits::{BoxError, PriceService};

#[derive(Default)]
struct Script {
    prices: HashMap<String, f64>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
    default_delay: Option<Duration>,
    drift: f64,
}

/// In-memory [`PriceService`] with fixed prices and scripted failures.
///
/// Every call is counted per item code, before any configured delay. With a
/// non-zero drift, the n-th call for an item returns `price + n * drift`, so
/// racing fetches of one key produce distinguishable values.
#[derive(Default)]
pub struct StaticPriceService {
    script: RwLock<Script>,
    calls: Mutex<HashMap<String, usize>>,
}

impl StaticPriceService {
    /// Creates a service with no prices.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a price.
    pub fn with_price(self, item_code: impl Into<String>, price: f64) -> Self {
        self.set_price(item_code, price);
        self
    }

    /// Makes lookups of `item_code` fail.
    pub fn with_failure(self, item_code: impl Into<String>) -> Self {
        self.set_failing(item_code, true);
        self
    }

    /// Delays lookups of `item_code`.
    pub fn with_delay(self, item_code: impl Into<String>, delay: Duration) -> Self {
        self.script.write().delays.insert(item_code.into(), delay);
        self
    }

    /// Delays lookups of items without their own delay.
    pub fn with_default_delay(self, delay: Duration) -> Self {
        self.script.write().default_delay = Some(delay);
        self
    }

    /// Shifts each successive price of an item by `drift`.
    pub fn with_drift(self, drift: f64) -> Self {
        self.script.write().drift = drift;
        self
    }

    /// Sets or replaces a price.
    pub fn set_price(&self, item_code: impl Into<String>, price: f64) {
        self.script.write().prices.insert(item_code.into(), price);
    }

    /// Toggles failure for `item_code`.
    pub fn set_failing(&self, item_code: impl Into<String>, failing: bool) {
        let item_code = item_code.into();
        let mut script = self.script.write();
        if failing {
            script.failing.insert(item_code);
        } else {
            script.failing.remove(&item_code);
        }
    }

    /// Returns how many lookups of `item_code` were made.
    pub fn calls(&self, item_code: &str) -> usize {
        self.calls.lock().get(item_code).copied().unwrap_or(0)
    }

    /// Returns how many lookups were made in total.
    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }
}

#[async_trait]
impl PriceService for StaticPriceService {
    async fn price_for(&self, item_code: &str) -> Result<f64, BoxError> {
        let nth = {
            let mut calls = self.calls.lock();
            let count = calls.entry(item_code.to_string()).or_insert(0);
            *count += 1;
            *count - 1
        };

        let delay = {
            let script = self.script.read();
            script.delays.get(item_code).copied().or(script.default_delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let script = self.script.read();
        if script.failing.contains(item_code) {
            return Err(format!("service unavailable for {item_code}").into());
        }
        match script.prices.get(item_code) {
            Some(price) => Ok(price + nth as f64 * script.drift),
            None => Err(format!("no price for {item_code}").into()),
        }
    }
}
