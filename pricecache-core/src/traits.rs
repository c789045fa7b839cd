//! Common traits for PRICECACHE.
//!
//! The cache consumes exactly one external capability: a price service that
//! may be slow and may fail. Anything implementing [`PriceService`] can sit
//! behind the cache.

use std::sync::Arc;

use async_trait::async_trait;

/// Opaque error returned by an upstream price service.
///
/// The cache only distinguishes failure from success; the message is kept
/// for diagnostics.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// ═══════════════════════════════════════════════════════════════════════════════
// PRICE SERVICE TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Interface for the slow, fallible price lookup behind the cache.
///
/// Implementations might be:
/// - An HTTP client for a pricing API
/// - A database query
/// - A scripted stub (for testing)
///
/// Must be safely callable from many tasks at once. No idempotency, rate
/// limiting or timeout is assumed; the cache adds none.
#[async_trait]
pub trait PriceService: Send + Sync {
    /// Fetches the current price for `item_code`.
    async fn price_for(&self, item_code: &str) -> Result<f64, BoxError>;
}

#[async_trait]
impl<T: PriceService + ?Sized> PriceService for Arc<T> {
    async fn price_for(&self, item_code: &str) -> Result<f64, BoxError> {
        (**self).price_for(item_code).await
    }
}
