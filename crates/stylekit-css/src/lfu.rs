//! Bounded least-frequently-used cache.
//!
//! Style builders keep one per border geometry kind so that the thousands of
//! identical cell borders in a table report are formatted once.

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    hits: u64,
    /// Insertion order, for breaking ties between equally cold entries.
    seq: u64,
}

/// A key -> value map holding at most `capacity` entries.
///
/// When full, inserting a new key evicts the entry with the fewest hits;
/// among those, the one inserted earliest goes first.
#[derive(Debug, Clone)]
pub struct LfuCache<K, V> {
    capacity: usize,
    entries: HashMap<K, Entry<V>>,
    next_seq: u64,
}

impl<K: Eq + Hash + Clone, V> LfuCache<K, V> {
    /// Create an empty cache.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "LFU cache capacity must be at least 1");
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            next_seq: 0,
        }
    }

    /// Look up `key`, counting the access.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let entry = self.entries.get_mut(key)?;
        entry.hits = entry.hits.saturating_add(1);
        Some(&entry.value)
    }

    /// Insert or replace `key`.
    ///
    /// The entry starts cold: its hit counter is zero and it counts as the
    /// most recently inserted.
    pub fn put(&mut self, key: K, value: V) {
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&key) {
            self.evict_one();
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        let _ = self.entries.insert(
            key,
            Entry {
                value,
                hits: 0,
                seq,
            },
        );
    }

    fn evict_one(&mut self) {
        let victim = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| (entry.hits, entry.seq))
            .map(|(key, _)| key.clone());
        if let Some(victim) = victim {
            let _ = self.entries.remove(&victim);
        }
    }

    /// Whether `key` is cached. Does not count as an access.
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Hit count for `key`, without counting this call.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.entries.get(key).map(|entry| entry.hits)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Internal consistency check, for tests.
    ///
    /// Size never exceeds capacity, and insertion stamps are unique and
    /// older than the next stamp to be handed out.
    pub fn validate(&self) -> bool {
        if self.entries.len() > self.capacity {
            return false;
        }
        let mut stamps: Vec<u64> = self.entries.values().map(|entry| entry.seq).collect();
        stamps.sort_unstable();
        stamps.windows(2).all(|pair| pair[0] < pair[1])
            && stamps.last().is_none_or(|&last| last < self.next_seq)
    }
}
