//! # l2cache
//!
//! Decorators stacked on a [`l2store::Cache`] to build a second-level cache.
//!
//! ## Chain
//! - **TransactionalCache**: per-session write buffer, published on commit,
//!   discarded on rollback
//! - **LoggingCache**: hit/miss counters and hit-ratio logging
//! - **SoftCache**: values held through weak handles, reclaimed once
//!   unreachable; recent reads pinned
//! - **PerpetualCache** (from `l2store`): the map at the bottom
//!
//! ```
//! use std::sync::Arc;
//! use l2cache::{SoftCache, TransactionalCache};
//! use l2store::{Cache, PerpetualCache};
//!
//! let shared: Arc<SoftCache<u32, String, _>> =
//!     Arc::new(SoftCache::new(PerpetualCache::new("users")).unwrap());
//! let session = TransactionalCache::new(Arc::clone(&shared));
//!
//! session.put(1u32, Arc::new("alice".to_string())).unwrap();
//! assert!(shared.get(&1).unwrap().is_none());
//!
//! session.commit().unwrap();
//! assert_eq!(shared.get(&1).unwrap().as_deref(), Some(&"alice".to_string()));
//! ```

#![warn(missing_docs)]

mod collector;
mod config;
mod logging;
mod lru;
mod manager;
mod soft;
mod stats;
mod transactional;

#[cfg(test)]
mod test_utils;

pub use collector::{Collector, SoftEntry};
pub use config::{SoftCacheConfig, DEFAULT_PIN_CAPACITY, DEFAULT_SOFT_CAPACITY};
pub use logging::LoggingCache;
pub use manager::{SharedCache, TransactionalCacheManager};
pub use soft::SoftCache;
pub use stats::CacheStats;
pub use transactional::TransactionalCache;
