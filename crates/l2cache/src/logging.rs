//! Hit-ratio logging decorator

use l2store::{Cache, Result};
use parking_lot::RwLock;
use tracing::debug;

use crate::stats::CacheStats;

/// Forwards every call to its delegate, counting lookups and logging the
/// running hit ratio
pub struct LoggingCache<C> {
    delegate: C,
    stats: CacheStats,
}

impl<C> LoggingCache<C> {
    /// Wrap `delegate`
    pub fn new(delegate: C) -> Self {
        Self {
            delegate,
            stats: CacheStats::new(),
        }
    }

    /// Counters collected so far
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// The wrapped cache
    pub fn delegate(&self) -> &C {
        &self.delegate
    }
}

impl<K, V, C> Cache<K, V> for LoggingCache<C>
where
    C: Cache<K, V>,
{
    fn id(&self) -> &str {
        self.delegate.id()
    }

    fn size(&self) -> Result<usize> {
        self.delegate.size()
    }

    fn put(&self, key: K, value: V) -> Result<()> {
        self.stats.record_put();
        self.delegate.put(key, value)
    }

    fn put_miss(&self, key: K) -> Result<()> {
        self.stats.record_put();
        self.delegate.put_miss(key)
    }

    fn get(&self, key: &K) -> Result<Option<V>> {
        let value = self.delegate.get(key)?;
        if value.is_some() {
            self.stats.record_hit();
        } else {
            self.stats.record_miss();
        }
        debug!(
            cache = self.delegate.id(),
            hit_ratio = self.stats.hit_ratio(),
            "cache hit ratio"
        );
        Ok(value)
    }

    fn remove(&self, key: &K) -> Result<Option<V>> {
        self.stats.record_removal();
        self.delegate.remove(key)
    }

    fn clear(&self) -> Result<()> {
        self.delegate.clear()
    }

    fn lock_handle(&self) -> Option<&RwLock<()>> {
        self.delegate.lock_handle()
    }
}
