//! # PRICECACHE Lookup
//!
//! Read-through cache in front of a slow, fallible price service.
//!
//! - **Single lookups** are served from the expiring store while fresh and
//!   fetched upstream otherwise. Failures are never cached.
//! - **Batch lookups** resolve every position on its own task, keep input
//!   order, and fail as a whole on the first error.
//!
//! ## Example
//!
//! ```rust,ignore
//! use pricecache_lookup::{CacheConfig, TransparentCache};
//!
//! let cache = TransparentCache::new(service, CacheConfig::with_max_age(Duration::from_secs(30)))?;
//!
//! let one = cache.get_price_for("sku-1").await?;
//! let many = cache.get_prices_for(&["sku-1", "sku-2", "sku-1"]).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod cache;
mod inflight;
mod stub;

pub use cache::TransparentCache;
pub use stub::StaticPriceService;

pub use pricecache_core::{BoxError, CacheConfig, PriceCacheError, PriceService, Result};
pub use pricecache_store::{CacheEntry, CacheStats, ExpiringStore};
