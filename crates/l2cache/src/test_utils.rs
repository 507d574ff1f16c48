//! Delegates used by the decorator tests

use std::collections::HashSet;
use std::hash::Hash;
use std::io;
use std::marker::PhantomData;

use l2store::{Cache, Error, PerpetualCache, Result};
use parking_lot::Mutex;

/// Cache operation, as seen by a test delegate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Size,
    Put,
    PutMiss,
    Get,
    Remove,
    Clear,
}

/// Store that logs every call before serving it
pub struct RecordingCache<K, V> {
    inner: PerpetualCache<K, V>,
    log: Mutex<Vec<(Op, Option<K>)>>,
}

impl<K, V> RecordingCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    pub fn new(id: &str) -> Self {
        Self {
            inner: PerpetualCache::new(id),
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(Op, Option<K>)> {
        self.log.lock().clone()
    }

    pub fn count(&self, op: Op) -> usize {
        self.log.lock().iter().filter(|(o, _)| *o == op).count()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.contains_key(key)
    }

    /// Read the store without logging
    pub fn peek(&self, key: &K) -> Option<V> {
        self.inner.get(key).ok().flatten()
    }

    pub fn forget_calls(&self) {
        self.log.lock().clear();
    }

    fn record(&self, op: Op, key: Option<&K>) {
        self.log.lock().push((op, key.cloned()));
    }
}

impl<K, V> Cache<K, V> for RecordingCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn id(&self) -> &str {
        self.inner.id()
    }

    fn size(&self) -> Result<usize> {
        self.record(Op::Size, None);
        self.inner.size()
    }

    fn put(&self, key: K, value: V) -> Result<()> {
        self.record(Op::Put, Some(&key));
        self.inner.put(key, value)
    }

    fn put_miss(&self, key: K) -> Result<()> {
        self.record(Op::PutMiss, Some(&key));
        self.inner.put_miss(key)
    }

    fn get(&self, key: &K) -> Result<Option<V>> {
        self.record(Op::Get, Some(key));
        self.inner.get(key)
    }

    fn remove(&self, key: &K) -> Result<Option<V>> {
        self.record(Op::Remove, Some(key));
        self.inner.remove(key)
    }

    fn clear(&self) -> Result<()> {
        self.record(Op::Clear, None);
        self.inner.clear()
    }
}

/// Blocking-style store: a missed `get` holds the key until it is written
pub struct LockingCache<K, V> {
    inner: PerpetualCache<K, V>,
    held: Mutex<HashSet<K>>,
    failing: HashSet<Op>,
}

impl<K, V> LockingCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    pub fn new(id: &str) -> Self {
        Self::failing(id, &[])
    }

    /// Selected writes fail before the key is released
    pub fn failing(id: &str, failing: &[Op]) -> Self {
        Self {
            inner: PerpetualCache::new(id),
            held: Mutex::new(HashSet::new()),
            failing: failing.iter().copied().collect(),
        }
    }

    pub fn is_held(&self, key: &K) -> bool {
        self.held.lock().contains(key)
    }

    pub fn held_count(&self) -> usize {
        self.held.lock().len()
    }
}

impl<K, V> Cache<K, V> for LockingCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn id(&self) -> &str {
        self.inner.id()
    }

    fn size(&self) -> Result<usize> {
        self.inner.size()
    }

    fn put(&self, key: K, value: V) -> Result<()> {
        check(&self.failing, Op::Put)?;
        self.held.lock().remove(&key);
        self.inner.put(key, value)
    }

    fn put_miss(&self, key: K) -> Result<()> {
        check(&self.failing, Op::PutMiss)?;
        self.held.lock().remove(&key);
        self.inner.put_miss(key)
    }

    fn get(&self, key: &K) -> Result<Option<V>> {
        let value = self.inner.get(key)?;
        if value.is_none() {
            self.held.lock().insert(key.clone());
        }
        Ok(value)
    }

    fn remove(&self, key: &K) -> Result<Option<V>> {
        self.held.lock().remove(key);
        self.inner.remove(key)
    }

    fn clear(&self) -> Result<()> {
        self.inner.clear()
    }
}

/// Store whose selected operations always fail with a backend error
pub struct FailingCache<K, V> {
    failing: HashSet<Op>,
    _marker: PhantomData<fn(K, V)>,
}

impl<K, V> FailingCache<K, V> {
    pub fn new(failing: &[Op]) -> Self {
        Self {
            failing: failing.iter().copied().collect(),
            _marker: PhantomData,
        }
    }

    fn check(&self, op: Op) -> Result<()> {
        check(&self.failing, op)
    }
}

fn check(failing: &HashSet<Op>, op: Op) -> Result<()> {
    if failing.contains(&op) {
        return Err(Error::backend(io::Error::new(
            io::ErrorKind::Other,
            format!("{:?} failed", op),
        )));
    }
    Ok(())
}

impl<K, V> Cache<K, V> for FailingCache<K, V> {
    fn id(&self) -> &str {
        "failing"
    }

    fn size(&self) -> Result<usize> {
        self.check(Op::Size)?;
        Ok(0)
    }

    fn put(&self, _key: K, _value: V) -> Result<()> {
        self.check(Op::Put)
    }

    fn put_miss(&self, _key: K) -> Result<()> {
        self.check(Op::PutMiss)
    }

    fn get(&self, _key: &K) -> Result<Option<V>> {
        self.check(Op::Get)?;
        Ok(None)
    }

    fn remove(&self, _key: &K) -> Result<Option<V>> {
        self.check(Op::Remove)?;
        Ok(None)
    }

    fn clear(&self) -> Result<()> {
        self.check(Op::Clear)
    }
}
