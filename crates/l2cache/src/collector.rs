//! Reclamation model behind [`crate::SoftCache`]
//!
//! Values handed to a soft cache are only weakly referenced by its delegate.
//! What keeps them alive is one of:
//! - soft retention: a bounded LRU of strong references standing in for the
//!   memory a garbage collector would let soft references keep,
//! - the soft cache's pin queue,
//! - callers still holding the `Arc`.
//!
//! A value pushed out of soft retention joins the released set. Sweeping the
//! released set posts the key of every value with no strong reference left
//! on the reclamation channel; the soft cache drains that channel and drops
//! the matching delegate entries.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use ahash::RandomState;
use l2store::{Error, Result};
use parking_lot::Mutex;
use tracing::debug;

use crate::lru::LruCache;

/// Reclaimable handle stored in a soft cache's delegate in place of a value
pub struct SoftEntry<V> {
    handle: Weak<V>,
}

impl<V> SoftEntry<V> {
    /// Get the value back if it is still reachable
    pub fn upgrade(&self) -> Option<Arc<V>> {
        self.handle.upgrade()
    }

    /// Check whether the value has already been reclaimed
    pub fn is_reclaimed(&self) -> bool {
        self.handle.strong_count() == 0
    }
}

impl<V> Clone for SoftEntry<V> {
    fn clone(&self) -> Self {
        Self {
            handle: Weak::clone(&self.handle),
        }
    }
}

impl<V> std::fmt::Debug for SoftEntry<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftEntry")
            .field("reclaimed", &self.is_reclaimed())
            .finish()
    }
}

/// Decides when softly held values are reclaimed and announces them
///
/// Every method takes `&self`, so sweeps may run from any thread while the
/// owning cache serves callers.
pub struct Collector<K, V> {
    /// Lock order: `retained` before `released`
    retained: Mutex<LruCache<K, Arc<V>>>,

    /// At most one handle per key: the one its delegate entry points to
    released: Mutex<HashMap<K, Weak<V>, RandomState>>,

    tx: flume::Sender<K>,
    rx: flume::Receiver<K>,

    reclaimed: AtomicU64,
}

impl<K, V> Collector<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a collector softly retaining up to `soft_capacity` values
    pub fn new(soft_capacity: usize) -> Result<Self> {
        if soft_capacity == 0 {
            return Err(Error::Config(
                "soft_capacity must be greater than 0".to_string(),
            ));
        }

        let (tx, rx) = flume::unbounded();
        Ok(Self {
            retained: Mutex::new(LruCache::new(soft_capacity)),
            released: Mutex::new(HashMap::with_hasher(RandomState::new())),
            tx,
            rx,
            reclaimed: AtomicU64::new(0),
        })
    }

    /// Start tracking `value` under `key` and hand out its delegate handle
    ///
    /// Any handle previously released for `key` is forgotten: the delegate
    /// entry it belonged to is being replaced.
    pub fn register(&self, key: K, value: &Arc<V>) -> SoftEntry<V> {
        self.admit(key, value);
        SoftEntry {
            handle: Arc::downgrade(value),
        }
    }

    /// Refresh the soft retention of a value that was just read
    ///
    /// A value that had already been released but is still reachable is
    /// taken back into soft retention.
    pub fn touch(&self, key: &K, value: &Arc<V>) {
        if !self.retained.lock().touch(key) {
            self.admit(key.clone(), value);
        }
    }

    /// Stop tracking `key`; no reclamation will be posted for it
    pub fn forget(&self, key: &K) {
        let mut retained = self.retained.lock();
        retained.remove(key);
        self.released.lock().remove(key);
    }

    /// Stop tracking `key` and hand out a handle that is already reclaimed
    ///
    /// Stands in for a miss-value: the delegate keeps an entry for `key`, and
    /// the first read finding it dead removes it.
    pub fn miss(&self, key: &K) -> SoftEntry<V> {
        self.forget(key);
        SoftEntry { handle: Weak::new() }
    }

    /// Sweep the released set, posting every unreachable value's key
    ///
    /// Returns how many values were reclaimed by this sweep.
    pub fn collect(&self) -> usize {
        let mut reclaimed = 0;
        self.released.lock().retain(|key, handle| {
            if handle.strong_count() > 0 {
                return true;
            }
            let _ = self.tx.send(key.clone());
            reclaimed += 1;
            false
        });

        if reclaimed > 0 {
            self.reclaimed.fetch_add(reclaimed as u64, Ordering::Relaxed);
            debug!(reclaimed, "collected unreachable soft values");
        }
        reclaimed
    }

    /// Simulate memory pressure: release soft retention down to `target`
    /// values, then sweep
    ///
    /// # Arguments
    /// * `target` - Number of values left in soft retention; 0 releases all
    ///
    /// # Returns
    /// How many values the sweep reclaimed. Pinned or caller-held values are
    /// released but not reclaimed.
    pub fn shrink(&self, target: usize) -> usize {
        let evicted = {
            let mut retained = self.retained.lock();
            let mut evicted = Vec::new();
            while retained.len() > target {
                match retained.pop_lru() {
                    Some(entry) => evicted.push(entry),
                    None => break,
                }
            }
            evicted
        };
        self.release(evicted);
        self.collect()
    }

    /// Change how many values soft retention may hold
    pub fn set_soft_capacity(&self, soft_capacity: usize) -> Result<()> {
        if soft_capacity == 0 {
            return Err(Error::Config(
                "soft_capacity must be greater than 0".to_string(),
            ));
        }

        let evicted = self.retained.lock().resize(soft_capacity);
        if !evicted.is_empty() {
            self.release(evicted);
            self.collect();
        }
        Ok(())
    }

    /// Drop all bookkeeping; pending notifications stay on the channel
    pub fn reset(&self) {
        let mut retained = self.retained.lock();
        retained.clear();
        self.released.lock().clear();
    }

    /// Take the next reclaimed key, if any
    ///
    /// Keys registered again after being posted are skipped: their delegate
    /// entry now points to a live value.
    pub fn poll(&self) -> Option<K> {
        while let Ok(key) = self.rx.try_recv() {
            if !self.is_live(&key) {
                return Some(key);
            }
        }
        None
    }

    /// Number of softly retained values
    pub fn retained_len(&self) -> usize {
        self.retained.lock().len()
    }

    /// Number of released values not yet reclaimed
    pub fn released_len(&self) -> usize {
        self.released.lock().len()
    }

    /// Soft retention bound
    pub fn soft_capacity(&self) -> usize {
        self.retained.lock().capacity()
    }

    /// Total values reclaimed since creation
    pub fn reclaimed_count(&self) -> u64 {
        self.reclaimed.load(Ordering::Relaxed)
    }

    fn admit(&self, key: K, value: &Arc<V>) {
        let evicted = {
            let mut retained = self.retained.lock();
            let evicted = retained.put(key.clone(), Arc::clone(value));
            self.released.lock().remove(&key);
            evicted
        };

        if let Some(entry) = evicted {
            self.release(vec![entry]);
            self.collect();
        }
    }

    fn is_live(&self, key: &K) -> bool {
        let retained = self.retained.lock();
        if retained.contains(key) {
            return true;
        }
        self.released
            .lock()
            .get(key)
            .is_some_and(|handle| handle.strong_count() > 0)
    }

    fn release(&self, evicted: Vec<(K, Arc<V>)>) {
        let mut released = self.released.lock();
        for (key, value) in evicted {
            released.insert(key, Arc::downgrade(&value));
        }
    }
}
