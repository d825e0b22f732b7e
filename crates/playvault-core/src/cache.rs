// ── Expiring response cache ──
//
// Concurrent key/value store where every entry carries its insertion time.
// Expired entries are evicted lazily on read.

use std::hash::Hash;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// A `DashMap`-backed cache with a single time-to-live for all entries.
///
/// A zero TTL disables caching: inserts are dropped and every read misses.
#[derive(Debug)]
pub struct TtlCache<K: Eq + Hash, V> {
    entries: DashMap<K, (Instant, V)>,
    ttl: Duration,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh value for `key`, evicting it if it has expired.
    pub fn get(&self, key: &K) -> Option<V> {
        {
            let entry = self.entries.get(key)?;
            let (stored_at, value) = entry.value();
            if stored_at.elapsed() < self.ttl {
                return Some(value.clone());
            }
        }
        // The read guard must be gone before removing, or the shard deadlocks.
        // `remove_if` keeps a value re-inserted in between.
        self.entries
            .remove_if(key, |_, (stored_at, _)| stored_at.elapsed() >= self.ttl);
        None
    }

    pub fn insert(&self, key: K, value: V) {
        if self.ttl.is_zero() {
            return;
        }
        self.entries.insert(key, (Instant::now(), value));
    }

    pub fn invalidate(&self, key: &K) {
        self.entries.remove(key);
    }

    /// Drop every entry whose key matches `predicate`.
    pub fn invalidate_where(&self, mut predicate: impl FnMut(&K) -> bool) {
        self.entries.retain(|key, _| !predicate(key));
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
