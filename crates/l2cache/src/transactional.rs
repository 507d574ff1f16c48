//! Transactional write buffer in front of a shared cache
//!
//! Holds every entry a session wants to add to the second-level cache until
//! the session commits; a rollback discards them. Reads go straight to the
//! delegate, so a session never sees its own uncommitted writes.
//!
//! Blocking delegates lock a key on a missed read until that key is written.
//! Every key this cache saw missing therefore gets a miss-value write on both
//! commit and rollback, unless the commit writes a real value for it.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use ahash::RandomState;
use l2store::{Cache, Result};
use tracing::{debug, warn};

/// Buffered state of the running transaction
struct TxState<K, V> {
    clear_on_commit: bool,

    /// `None` is a buffered miss-value write
    pending: HashMap<K, Option<V>, RandomState>,

    missed: HashSet<K, RandomState>,
}

impl<K, V> TxState<K, V> {
    fn new() -> Self {
        Self {
            clear_on_commit: false,
            pending: HashMap::with_hasher(RandomState::new()),
            missed: HashSet::with_hasher(RandomState::new()),
        }
    }

    fn reset(&mut self) {
        self.clear_on_commit = false;
        self.pending.clear();
        self.missed.clear();
    }
}

/// Session-scoped cache decorator buffering writes until commit
///
/// Not `Sync`: one session owns it and serializes its calls.
pub struct TransactionalCache<K, V, C> {
    delegate: C,
    state: RefCell<TxState<K, V>>,
}

impl<K, V, C> TransactionalCache<K, V, C>
where
    K: Hash + Eq + Clone,
    V: Clone,
    C: Cache<K, V>,
{
    /// Start buffering in front of `delegate`
    pub fn new(delegate: C) -> Self {
        Self {
            delegate,
            state: RefCell::new(TxState::new()),
        }
    }

    /// Publish buffered writes to the delegate
    ///
    /// Clears the delegate first if [`Cache::clear`] was called during the
    /// transaction, then writes every buffered entry and a miss-value for
    /// every missed key left without one.
    ///
    /// # Returns
    /// `Ok(())` once the delegate holds the transaction's writes; the state
    /// is reset for the next transaction.
    ///
    /// # Errors
    /// The first delegate error, as is. Missed keys with no buffered write
    /// still get their miss-value before it is returned. The buffered state
    /// is kept: a missed key whose own write failed stays locked in a
    /// blocking delegate until [`TransactionalCache::rollback`] is called.
    pub fn commit(&self) -> Result<()> {
        let mut state = self.state.borrow_mut();

        if let Err(err) = self.publish(&state) {
            if let Err(release_err) = self.release_missed(&state) {
                warn!(
                    cache = self.delegate.id(),
                    error = %release_err,
                    "failed to release missed keys after commit error"
                );
            }
            return Err(err);
        }
        self.release_missed(&state)?;

        debug!(
            cache = self.delegate.id(),
            writes = state.pending.len(),
            missed = state.missed.len(),
            cleared = state.clear_on_commit,
            "committed transactional cache"
        );
        state.reset();
        Ok(())
    }

    /// Discard buffered writes, releasing the keys this transaction missed
    pub fn rollback(&self) -> Result<()> {
        let mut state = self.state.borrow_mut();

        for key in &state.missed {
            self.delegate.put_miss(key.clone())?;
        }

        debug!(
            cache = self.delegate.id(),
            discarded = state.pending.len(),
            missed = state.missed.len(),
            "rolled back transactional cache"
        );
        state.reset();
        Ok(())
    }

    /// Check whether commit would change the delegate
    pub fn is_dirty(&self) -> bool {
        let state = self.state.borrow();
        state.clear_on_commit || !state.pending.is_empty() || !state.missed.is_empty()
    }

    /// Number of buffered writes
    pub fn pending_len(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Number of keys seen missing in the delegate
    pub fn missed_len(&self) -> usize {
        self.state.borrow().missed.len()
    }

    /// Whether commit will clear the delegate
    pub fn clears_on_commit(&self) -> bool {
        self.state.borrow().clear_on_commit
    }

    /// The wrapped cache
    pub fn delegate(&self) -> &C {
        &self.delegate
    }

    fn publish(&self, state: &TxState<K, V>) -> Result<()> {
        if state.clear_on_commit {
            self.delegate.clear()?;
        }

        for (key, value) in &state.pending {
            match value {
                Some(value) => self.delegate.put(key.clone(), value.clone())?,
                None => self.delegate.put_miss(key.clone())?,
            }
        }
        Ok(())
    }

    fn release_missed(&self, state: &TxState<K, V>) -> Result<()> {
        for key in &state.missed {
            if !state.pending.contains_key(key) {
                self.delegate.put_miss(key.clone())?;
            }
        }
        Ok(())
    }
}

impl<K, V, C> Cache<K, V> for TransactionalCache<K, V, C>
where
    K: Hash + Eq + Clone,
    V: Clone,
    C: Cache<K, V>,
{
    fn id(&self) -> &str {
        self.delegate.id()
    }

    fn size(&self) -> Result<usize> {
        self.delegate.size()
    }

    fn put(&self, key: K, value: V) -> Result<()> {
        self.state.borrow_mut().pending.insert(key, Some(value));
        Ok(())
    }

    fn put_miss(&self, key: K) -> Result<()> {
        self.state.borrow_mut().pending.insert(key, None);
        Ok(())
    }

    fn get(&self, key: &K) -> Result<Option<V>> {
        let value = self.delegate.get(key)?;

        let mut state = self.state.borrow_mut();
        if value.is_none() {
            state.missed.insert(key.clone());
        }
        if state.clear_on_commit {
            return Ok(None);
        }
        Ok(value)
    }

    // Removal is not transactional: nothing is buffered and the delegate is
    // left untouched.
    fn remove(&self, _key: &K) -> Result<Option<V>> {
        Ok(None)
    }

    fn clear(&self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.clear_on_commit = true;
        state.pending.clear();
        Ok(())
    }
}
