//! Trace-driven simulator for a single set-associative cache.
//!
//! A [`CacheConfig`] is validated into a [`Geometry`] and turned into a boxed
//! [`CacheModel`], whose [`access`](CacheModel::access) classifies each
//! address as a hit or a miss.
//!
//! ```
//! use cache_sim::{AccessResult, CacheConfig};
//!
//! let mut cache = CacheConfig::new(64, 16, 2, "LRU").to_cache().unwrap();
//! assert_eq!(cache.access(0), AccessResult::Miss);
//! assert_eq!(cache.access(4), AccessResult::Hit);
//! assert_eq!(cache.stats().hit_rate, 0.5);
//! ```

pub mod addr;
pub mod cache;
pub mod config;
pub mod error;
pub mod replace;
pub mod stats;
pub mod trace;

pub use cache::CacheModel;
pub use config::{CacheConfig, Geometry, Policy, SimConfig};
pub use error::{CacheError, ConfigViolation};
pub use replace::AccessResult;
pub use stats::{CacheReport, Stats};
