//! Construction-time cache configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CANCEL_ON_ERROR, DEFAULT_COALESCE_IN_FLIGHT, DEFAULT_MAX_AGE_MS};
use crate::error::{PriceCacheError, Result};

/// Cache configuration.
///
/// `max_age_ms` applies uniformly to every key; there is no per-key override.
/// Durations are kept at millisecond granularity; the `Duration` builders round
/// a sub-millisecond remainder up to the next whole millisecond.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum age of a cached price in milliseconds
    pub max_age_ms: u64,
    /// Whether concurrent misses on one key share a single upstream fetch
    pub coalesce_in_flight: bool,
    /// Whether a failing batch aborts its still-running siblings
    pub cancel_on_error: bool,
    /// Interval of the optional expired-entry sweeper (None = lazy eviction only)
    pub sweep_interval_ms: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age_ms: DEFAULT_MAX_AGE_MS,
            coalesce_in_flight: DEFAULT_COALESCE_IN_FLIGHT,
            cancel_on_error: DEFAULT_CANCEL_ON_ERROR,
            sweep_interval_ms: None,
        }
    }
}

impl CacheConfig {
    /// Creates a config with the given max age.
    pub fn with_max_age(max_age: Duration) -> Self {
        Self {
            max_age_ms: millis_ceil(max_age),
            ..Default::default()
        }
    }

    /// Parses a JSON config and validates it.
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the max age in milliseconds.
    pub fn with_max_age_ms(mut self, max_age_ms: u64) -> Self {
        self.max_age_ms = max_age_ms;
        self
    }

    /// Enables in-flight coalescing.
    pub fn coalesce_in_flight(mut self) -> Self {
        self.coalesce_in_flight = true;
        self
    }

    /// Enables sibling cancellation on batch failure.
    pub fn cancel_on_error(mut self) -> Self {
        self.cancel_on_error = true;
        self
    }

    /// Enables the periodic sweeper.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval_ms = Some(millis_ceil(interval));
        self
    }

    /// Returns the max age as a `Duration`.
    pub fn max_age(&self) -> Duration {
        Duration::from_millis(self.max_age_ms)
    }

    /// Returns the sweeper interval, if enabled.
    pub fn sweep_interval(&self) -> Option<Duration> {
        self.sweep_interval_ms.map(Duration::from_millis)
    }

    /// Checks the configuration for values the cache cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.max_age_ms == 0 {
            return Err(PriceCacheError::ConfigError(
                "max_age_ms must be greater than zero".into(),
            ));
        }
        if self.sweep_interval_ms == Some(0) {
            return Err(PriceCacheError::ConfigError(
                "sweep_interval_ms must be greater than zero when set".into(),
            ));
        }
        Ok(())
    }
}

/// Whole milliseconds in `d`, rounded up, saturating at `u64::MAX`.
fn millis_ceil(d: Duration) -> u64 {
    let partial = d.subsec_nanos() % 1_000_000 != 0;
    let millis = d.as_millis() + u128::from(partial);
    u64::try_from(millis).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_default_is_valid() {
        let config = CacheConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_age(), Duration::from_secs(60));
        assert!(!config.coalesce_in_flight);
        assert!(!config.cancel_on_error);
        assert!(config.sweep_interval().is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = CacheConfig::with_max_age(Duration::from_secs(1))
            .coalesce_in_flight()
            .cancel_on_error()
            .with_sweep_interval(Duration::from_millis(250));

        assert_eq!(config.max_age_ms, 1_000);
        assert!(config.coalesce_in_flight);
        assert!(config.cancel_on_error);
        assert_eq!(config.sweep_interval(), Some(Duration::from_millis(250)));
    }

    #[test_case(Duration::ZERO, 0 ; "zero stays zero")]
    #[test_case(Duration::from_micros(500), 1 ; "sub millisecond rounds up")]
    #[test_case(Duration::from_micros(1_500), 2 ; "fraction rounds up")]
    #[test_case(Duration::from_millis(7), 7 ; "whole millis unchanged")]
    #[test_case(Duration::MAX, u64::MAX ; "saturates")]
    fn test_duration_builders_round_up(duration: Duration, expected_ms: u64) {
        let config = CacheConfig::with_max_age(duration).with_sweep_interval(duration);
        assert_eq!(config.max_age_ms, expected_ms);
        assert_eq!(config.sweep_interval_ms, Some(expected_ms));
    }

    #[test]
    fn test_sub_millisecond_max_age_is_valid() {
        let config = CacheConfig::with_max_age(Duration::from_micros(500));
        assert!(config.validate().is_ok());
        assert_eq!(config.max_age(), Duration::from_millis(1));
    }

    #[test_case(0, None ; "zero max age")]
    #[test_case(1_000, Some(0) ; "zero sweep interval")]
    fn test_invalid_config(max_age_ms: u64, sweep_interval_ms: Option<u64>) {
        let config = CacheConfig {
            max_age_ms,
            sweep_interval_ms,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(PriceCacheError::ConfigError(_))));
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = CacheConfig::from_json(r#"{ "max_age_ms": 1500 }"#).unwrap();
        assert_eq!(config.max_age_ms, 1500);
        assert!(!config.coalesce_in_flight);
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        assert!(matches!(
            CacheConfig::from_json(r#"{ "max_age_ms": 0 }"#),
            Err(PriceCacheError::ConfigError(_))
        ));
        assert!(matches!(
            CacheConfig::from_json("not json"),
            Err(PriceCacheError::JsonError(_))
        ));
    }
}
