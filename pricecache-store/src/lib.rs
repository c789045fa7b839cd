//! Expiring store for PRICECACHE.
//!
//! Concurrency-safe key to price map where every entry carries an absolute
//! expiration instant. Expired entries are reclaimed lazily when read, or in
//! bulk by an explicit purge or the optional sweeper.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod store;
mod sweeper;

pub use store::{CacheEntry, CacheStats, ExpiringStore};
pub use sweeper::spawn_sweeper;
