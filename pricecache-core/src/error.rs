//! Error types for PRICECACHE.
//!
//! A single lookup error kind, [`PriceCacheError::UpstreamLookupFailure`],
//! covers every failed price fetch. The remaining variants describe problems
//! with configuration or the batch task group, never a lookup outcome.

use thiserror::Error;

/// Result type alias using `PriceCacheError`.
pub type Result<T> = std::result::Result<T, PriceCacheError>;

/// Main error type for all PRICECACHE operations.
#[derive(Debug, Error)]
pub enum PriceCacheError {
    // ═══════════════════════════════════════════════════════════════════════════
    // LOOKUP ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The upstream price service failed for a key.
    ///
    /// Never cached: the next lookup of `key` calls upstream again.
    #[error("Price lookup failed for '{key}': {reason}")]
    UpstreamLookupFailure { key: String, reason: String },

    // ═══════════════════════════════════════════════════════════════════════════
    // BATCH ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// A batch worker panicked or was aborted before producing a result.
    #[error("Batch task failed: {0}")]
    TaskFailed(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl PriceCacheError {
    /// Builds an upstream failure for `key` from the service's error.
    pub fn upstream(key: impl Into<String>, reason: impl ToString) -> Self {
        PriceCacheError::UpstreamLookupFailure {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns true if this error is recoverable (can retry).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PriceCacheError::UpstreamLookupFailure { .. })
    }

    /// Returns the key whose upstream lookup failed, if any.
    pub fn failed_key(&self) -> Option<&str> {
        match self {
            PriceCacheError::UpstreamLookupFailure { key, .. } => Some(key.as_str()),
            _ => None,
        }
    }
}
