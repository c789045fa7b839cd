//! # PRICECACHE Core
//!
//! Foundational building blocks shared by the PRICECACHE crates:
//!
//! - **Errors**: the lookup error taxonomy and crate `Result` alias
//! - **Traits**: the upstream [`PriceService`] capability
//! - **Clock**: monotonic time source used for expiration
//! - **Config**: construction-time cache configuration
//! - **Constants**: configuration defaults
//!
//! ## Example
//!
//! ```rust
//! use pricecache_core::CacheConfig;
//!
//! let config = CacheConfig::default().with_max_age_ms(1_000);
//! assert!(config.validate().is_ok());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod traits;

// Re-export commonly used items at crate root
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CacheConfig;
pub use constants::*;
pub use error::{PriceCacheError, Result};
pub use traits::{BoxError, PriceService};
