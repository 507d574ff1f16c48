//! Cache capability shared by the base store and every decorator

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Result;

/// Minimal read/write/clear contract of a second-level cache
///
/// Methods take `&self`: stores that are shared between sessions synchronize
/// internally. A miss is `Ok(None)`; errors are reserved for failures of the
/// backing store and are propagated unchanged by decorators.
pub trait Cache<K, V> {
    /// Identifier of the cache (usually the namespace it serves)
    fn id(&self) -> &str;

    /// Number of entries, miss-value entries included
    fn size(&self) -> Result<usize>;

    /// Store a value for `key`, replacing any previous entry
    fn put(&self, key: K, value: V) -> Result<()>;

    /// Store the miss-value for `key`
    ///
    /// The key becomes present with no value. A blocking store uses this
    /// write to release the per-key lock taken by a missed [`Cache::get`].
    fn put_miss(&self, key: K) -> Result<()>;

    /// Look up `key`; `None` for both absent keys and miss-value entries
    fn get(&self, key: &K) -> Result<Option<V>>;

    /// Remove `key`, returning the previous value if there was one
    fn remove(&self, key: &K) -> Result<Option<V>>;

    /// Remove every entry
    fn clear(&self) -> Result<()>;

    /// Exclusive/shared lock guarding the store, if it exposes one
    fn lock_handle(&self) -> Option<&RwLock<()>> {
        None
    }
}

macro_rules! forward_cache {
    ($ptr:ident) => {
        impl<K, V, C> Cache<K, V> for $ptr<C>
        where
            C: Cache<K, V> + ?Sized,
        {
            fn id(&self) -> &str {
                (**self).id()
            }

            fn size(&self) -> Result<usize> {
                (**self).size()
            }

            fn put(&self, key: K, value: V) -> Result<()> {
                (**self).put(key, value)
            }

            fn put_miss(&self, key: K) -> Result<()> {
                (**self).put_miss(key)
            }

            fn get(&self, key: &K) -> Result<Option<V>> {
                (**self).get(key)
            }

            fn remove(&self, key: &K) -> Result<Option<V>> {
                (**self).remove(key)
            }

            fn clear(&self) -> Result<()> {
                (**self).clear()
            }

            fn lock_handle(&self) -> Option<&RwLock<()>> {
                (**self).lock_handle()
            }
        }
    };
}

forward_cache!(Arc);
forward_cache!(Box);
