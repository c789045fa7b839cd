//! # PRICECACHE Batch Lookup Example
//!
//! Puts a transparent cache in front of a slow scripted price service and
//! shows hits, misses, a fan-out batch and a failing batch.
//!
//! ## Run
//!
//! ```bash
//! RUST_LOG=debug cargo run -p pricecache-lookup --example batch_lookup
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pricecache_lookup::{CacheConfig, StaticPriceService, TransparentCache};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let service = Arc::new(
        StaticPriceService::new()
            .with_price("apple", 1.25)
            .with_price("pear", 2.10)
            .with_price("plum", 0.80)
            .with_failure("durian")
            .with_default_delay(Duration::from_millis(300)),
    );

    let config = CacheConfig::with_max_age(Duration::from_secs(2))
        .with_sweep_interval(Duration::from_secs(1));
    let cache = TransparentCache::new(service.clone(), config)?;
    let sweeper = cache.start_sweeper();

    let started = Instant::now();
    let apple = cache.get_price_for("apple").await?;
    println!("apple = {apple:.2} (miss, {:?})", started.elapsed());

    let started = Instant::now();
    let apple = cache.get_price_for("apple").await?;
    println!("apple = {apple:.2} (hit, {:?})", started.elapsed());

    let started = Instant::now();
    let basket = cache.get_prices_for(&["pear", "apple", "plum", "pear"]).await?;
    println!("basket = {basket:?} ({:?})", started.elapsed());

    match cache.get_prices_for(&["apple", "durian"]).await {
        Ok(prices) => println!("unexpected prices: {prices:?}"),
        Err(err) => println!("batch failed: {err}"),
    }

    tokio::time::sleep(Duration::from_secs(3)).await;
    println!("after expiry: {:?}", cache.stats());

    let apple = cache.get_price_for("apple").await?;
    println!(
        "apple = {apple:.2} (refetched, {} upstream calls total)",
        service.total_calls()
    );

    if let Some(handle) = sweeper {
        handle.abort();
    }
    Ok(())
}
