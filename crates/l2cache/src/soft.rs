//! Soft reference cache decorator
//!
//! The delegate stores [`SoftEntry`] handles instead of values, so a value
//! stays retrievable only while something keeps it strongly reachable. The
//! most recently read values are pinned in a bounded queue to resist
//! reclamation.

use std::collections::VecDeque;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use l2store::{Cache, Result};
use parking_lot::Mutex;
use tracing::trace;

use crate::collector::{Collector, SoftEntry};
use crate::config::SoftCacheConfig;

/// Cache decorator evicting values once they become unreachable
pub struct SoftCache<K, V, C> {
    delegate: C,

    /// Most recently read first
    pinned: Mutex<VecDeque<Arc<V>>>,

    pin_capacity: AtomicUsize,

    collector: Collector<K, V>,
}

impl<K, V, C> SoftCache<K, V, C>
where
    K: Hash + Eq + Clone,
    C: Cache<K, SoftEntry<V>>,
{
    /// Wrap `delegate` with the default configuration
    pub fn new(delegate: C) -> Result<Self> {
        Self::with_config(delegate, SoftCacheConfig::default())
    }

    /// Wrap `delegate` with explicit settings
    ///
    /// # Arguments
    /// * `delegate` - Store receiving [`SoftEntry`] handles in place of values
    /// * `config` - Pin queue bound and soft retention capacity
    ///
    /// # Returns
    /// The soft cache, or [`l2store::Error::Config`] if `config` is invalid
    pub fn with_config(delegate: C, config: SoftCacheConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            delegate,
            pinned: Mutex::new(VecDeque::with_capacity(config.pin_capacity)),
            pin_capacity: AtomicUsize::new(config.pin_capacity),
            collector: Collector::new(config.soft_capacity)?,
        })
    }

    /// Change the pin queue bound
    ///
    /// An over-long queue is trimmed on the next pin, not here.
    pub fn set_size(&self, capacity: usize) {
        self.pin_capacity.store(capacity, Ordering::Relaxed);
    }

    /// Current pin queue bound
    pub fn pin_capacity(&self) -> usize {
        self.pin_capacity.load(Ordering::Relaxed)
    }

    /// Number of values currently pinned
    pub fn pinned_len(&self) -> usize {
        self.pinned.lock().len()
    }

    /// Check whether this exact value is pinned
    pub fn is_pinned(&self, value: &Arc<V>) -> bool {
        self.pinned.lock().iter().any(|pinned| Arc::ptr_eq(pinned, value))
    }

    /// Reclamation model deciding when values are released
    pub fn collector(&self) -> &Collector<K, V> {
        &self.collector
    }

    /// The wrapped cache
    pub fn delegate(&self) -> &C {
        &self.delegate
    }

    fn pin(&self, value: Arc<V>) {
        let capacity = self.pin_capacity();
        let mut pinned = self.pinned.lock();
        pinned.push_front(value);
        while pinned.len() > capacity {
            pinned.pop_back();
        }
    }

    /// Drop delegate entries whose values were reported reclaimed
    fn remove_reclaimed(&self) -> Result<()> {
        let mut removed = 0usize;
        while let Some(key) = self.collector.poll() {
            self.delegate.remove(&key)?;
            removed += 1;
        }

        if removed > 0 {
            trace!(cache = self.delegate.id(), removed, "removed reclaimed entries");
        }
        Ok(())
    }
}

impl<K, V, C> Cache<K, Arc<V>> for SoftCache<K, V, C>
where
    K: Hash + Eq + Clone,
    C: Cache<K, SoftEntry<V>>,
{
    fn id(&self) -> &str {
        self.delegate.id()
    }

    fn size(&self) -> Result<usize> {
        self.remove_reclaimed()?;
        self.delegate.size()
    }

    fn put(&self, key: K, value: Arc<V>) -> Result<()> {
        self.remove_reclaimed()?;
        let entry = self.collector.register(key.clone(), &value);
        self.delegate.put(key, entry)
    }

    fn put_miss(&self, key: K) -> Result<()> {
        self.remove_reclaimed()?;
        let entry = self.collector.miss(&key);
        self.delegate.put(key, entry)
    }

    // No reclaimed-entry cleanup here: reads only drop the key they found dead.
    fn get(&self, key: &K) -> Result<Option<Arc<V>>> {
        let Some(entry) = self.delegate.get(key)? else {
            return Ok(None);
        };

        match entry.upgrade() {
            Some(value) => {
                self.collector.touch(key, &value);
                self.pin(Arc::clone(&value));
                Ok(Some(value))
            }
            None => {
                self.collector.forget(key);
                self.delegate.remove(key)?;
                Ok(None)
            }
        }
    }

    fn remove(&self, key: &K) -> Result<Option<Arc<V>>> {
        self.remove_reclaimed()?;
        let previous = self.delegate.remove(key)?.and_then(|entry| entry.upgrade());
        self.collector.forget(key);
        Ok(previous)
    }

    fn clear(&self) -> Result<()> {
        self.pinned.lock().clear();
        self.remove_reclaimed()?;
        self.collector.reset();
        self.delegate.clear()
    }
}
