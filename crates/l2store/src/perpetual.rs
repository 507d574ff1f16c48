//! Map-backed base store
//!
//! Entries live until removed or cleared. A key written through
//! [`Cache::put_miss`] is kept as present-with-no-value.

use std::collections::HashMap;
use std::hash::Hash;

use ahash::RandomState;
use parking_lot::RwLock;

use crate::cache::Cache;
use crate::error::Result;

/// PerpetualCache is the storage end of every decorator chain
pub struct PerpetualCache<K, V> {
    /// Cache identifier
    id: String,

    /// `None` marks a miss-value entry
    entries: RwLock<HashMap<K, Option<V>, RandomState>>,
}

impl<K, V> PerpetualCache<K, V>
where
    K: Hash + Eq,
    V: Clone,
{
    /// Create an empty store
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_capacity(id, 0)
    }

    /// Create an empty store with room for `capacity` entries
    pub fn with_capacity(id: impl Into<String>, capacity: usize) -> Self {
        Self {
            id: id.into(),
            entries: RwLock::new(HashMap::with_capacity_and_hasher(
                capacity,
                RandomState::new(),
            )),
        }
    }

    /// Check whether `key` has an entry, miss-value entries included
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Check if the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<K, V> Cache<K, V> for PerpetualCache<K, V>
where
    K: Hash + Eq,
    V: Clone,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn size(&self) -> Result<usize> {
        Ok(self.entries.read().len())
    }

    fn put(&self, key: K, value: V) -> Result<()> {
        self.entries.write().insert(key, Some(value));
        Ok(())
    }

    fn put_miss(&self, key: K) -> Result<()> {
        self.entries.write().insert(key, None);
        Ok(())
    }

    fn get(&self, key: &K) -> Result<Option<V>> {
        Ok(self.entries.read().get(key).cloned().flatten())
    }

    fn remove(&self, key: &K) -> Result<Option<V>> {
        Ok(self.entries.write().remove(key).flatten())
    }

    fn clear(&self) -> Result<()> {
        self.entries.write().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_get() {
        let cache = PerpetualCache::new("users");

        cache.put("alice", 1).unwrap();
        cache.put("bob", 2).unwrap();

        assert_eq!(cache.get(&"alice").unwrap(), Some(1));
        assert_eq!(cache.get(&"bob").unwrap(), Some(2));
        assert_eq!(cache.size().unwrap(), 2);
        assert_eq!(cache.id(), "users");
    }

    #[test]
    fn test_get_missing() {
        let cache: PerpetualCache<&str, i32> = PerpetualCache::new("users");

        assert_eq!(cache.get(&"nobody").unwrap(), None);
        assert!(!cache.contains_key(&"nobody"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_overwrite() {
        let cache = PerpetualCache::new("users");

        cache.put("alice", 1).unwrap();
        cache.put("alice", 2).unwrap();

        assert_eq!(cache.get(&"alice").unwrap(), Some(2));
        assert_eq!(cache.size().unwrap(), 1);
    }

    #[test]
    fn test_miss_value_is_present() {
        let cache: PerpetualCache<&str, i32> = PerpetualCache::new("users");

        cache.put_miss("ghost").unwrap();

        assert_eq!(cache.get(&"ghost").unwrap(), None);
        assert!(cache.contains_key(&"ghost"));
        assert_eq!(cache.size().unwrap(), 1);

        // A real value replaces the sentinel
        cache.put("ghost", 5).unwrap();
        assert_eq!(cache.get(&"ghost").unwrap(), Some(5));
        assert_eq!(cache.size().unwrap(), 1);
    }

    #[test]
    fn test_remove() {
        let cache = PerpetualCache::new("users");

        cache.put("alice", 1).unwrap();
        cache.put_miss("ghost").unwrap();

        assert_eq!(cache.remove(&"alice").unwrap(), Some(1));
        assert_eq!(cache.remove(&"alice").unwrap(), None);
        assert_eq!(cache.remove(&"ghost").unwrap(), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear() {
        let cache = PerpetualCache::with_capacity("users", 16);

        cache.put(1u64, "a".to_string()).unwrap();
        cache.put(2u64, "b".to_string()).unwrap();
        cache.clear().unwrap();

        assert_eq!(cache.size().unwrap(), 0);
        assert_eq!(cache.get(&1).unwrap(), None);
    }
}
