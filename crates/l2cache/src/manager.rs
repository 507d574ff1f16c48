//! Per-session owner of transactional caches

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use ahash::RandomState;
use l2store::{Cache, Result};

use crate::transactional::TransactionalCache;

/// Second-level cache shared between sessions
pub type SharedCache<K, V> = Arc<dyn Cache<K, V> + Send + Sync>;

/// Keeps one [`TransactionalCache`] per shared cache touched by a session
///
/// Caches are told apart by [`Cache::id`].
pub struct TransactionalCacheManager<K, V> {
    caches: HashMap<String, TransactionalCache<K, V, SharedCache<K, V>>, RandomState>,
}

impl<K, V> Default for TransactionalCacheManager<K, V> {
    fn default() -> Self {
        Self {
            caches: HashMap::with_hasher(RandomState::new()),
        }
    }
}

impl<K, V> TransactionalCacheManager<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Create a manager with no open transactional caches
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `key` from `cache` through the session's buffer
    ///
    /// # Arguments
    /// * `cache` - Shared cache to read; its transactional cache is opened on
    ///   first use
    /// * `key` - Key to look up
    ///
    /// # Returns
    /// The committed value, or `None` on a miss or after a pending clear
    pub fn get(&mut self, cache: &SharedCache<K, V>, key: &K) -> Result<Option<V>> {
        self.transactional(cache).get(key)
    }

    /// Buffer a write to `cache`
    pub fn put(&mut self, cache: &SharedCache<K, V>, key: K, value: V) -> Result<()> {
        self.transactional(cache).put(key, value)
    }

    /// Schedule `cache` to be cleared on commit
    pub fn clear(&mut self, cache: &SharedCache<K, V>) -> Result<()> {
        self.transactional(cache).clear()
    }

    /// Commit every transactional cache, stopping at the first error
    pub fn commit(&mut self) -> Result<()> {
        for cache in self.caches.values() {
            cache.commit()?;
        }
        Ok(())
    }

    /// Roll back every transactional cache, stopping at the first error
    pub fn rollback(&mut self) -> Result<()> {
        for cache in self.caches.values() {
            cache.rollback()?;
        }
        Ok(())
    }

    /// Number of shared caches this session has touched
    pub fn len(&self) -> usize {
        self.caches.len()
    }

    /// Check whether the session has touched no cache yet
    pub fn is_empty(&self) -> bool {
        self.caches.is_empty()
    }

    fn transactional(
        &mut self,
        cache: &SharedCache<K, V>,
    ) -> &TransactionalCache<K, V, SharedCache<K, V>> {
        self.caches
            .entry(cache.id().to_string())
            .or_insert_with(|| TransactionalCache::new(Arc::clone(cache)))
    }
}
