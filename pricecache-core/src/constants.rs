//! Configuration defaults for PRICECACHE.

// ═══════════════════════════════════════════════════════════════════════════════
// FRESHNESS
// ═══════════════════════════════════════════════════════════════════════════════

/// Default maximum age of a cached price, in milliseconds (1 minute).
pub const DEFAULT_MAX_AGE_MS: u64 = 60_000;

// ═══════════════════════════════════════════════════════════════════════════════
// BATCH BEHAVIOUR
// ═══════════════════════════════════════════════════════════════════════════════

/// Concurrent misses on one key each call upstream unless coalescing is enabled.
pub const DEFAULT_COALESCE_IN_FLIGHT: bool = false;

/// Batch siblings keep running after the first failure unless this is enabled.
pub const DEFAULT_CANCEL_ON_ERROR: bool = false;
