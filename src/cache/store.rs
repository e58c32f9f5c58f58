//! Cache Store Module
//!
//! Authoritative key -> entry mapping combined with the policy's ordering
//! index. Membership changes go through `insert`, `remove` and `clear` only,
//! which keep both structures in sync.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use crate::cache::{CacheEntry, CacheStats, LfuTracker, LruTracker};
use crate::config::{CacheConfig, PolicyKind};

// == Order Index ==
/// Auxiliary ordering structure, shaped by the active policy.
#[derive(Debug)]
enum OrderIndex<K> {
    /// Recency order for LRU
    Recency(LruTracker<K>),
    /// Frequency index for LFU
    Frequency(LfuTracker<K>),
    /// TTL-only and custom policies scan the mapping directly
    Unordered,
}

impl<K: Hash + Eq + Clone> OrderIndex<K> {
    fn for_policy(policy: PolicyKind) -> Self {
        match policy {
            PolicyKind::Lru => OrderIndex::Recency(LruTracker::new()),
            PolicyKind::Lfu => OrderIndex::Frequency(LfuTracker::new()),
            PolicyKind::Ttl | PolicyKind::Custom => OrderIndex::Unordered,
        }
    }

    /// Tracks a newly admitted entry.
    fn admit<V>(&mut self, key: &K, entry: &CacheEntry<V>) {
        match self {
            OrderIndex::Recency(lru) => lru.touch(key),
            OrderIndex::Frequency(lfu) => lfu.insert(entry.rank(), key.clone()),
            OrderIndex::Unordered => {}
        }
    }

    /// Records an access. Must run before `entry` itself is touched.
    fn touch<V>(&mut self, key: &K, entry: &CacheEntry<V>) {
        match self {
            OrderIndex::Recency(lru) => lru.touch(key),
            OrderIndex::Frequency(lfu) => lfu.promote(entry.rank()),
            OrderIndex::Unordered => {}
        }
    }

    fn remove<V>(&mut self, key: &K, entry: &CacheEntry<V>) {
        match self {
            OrderIndex::Recency(lru) => lru.remove(key),
            OrderIndex::Frequency(lfu) => {
                lfu.remove(entry.rank());
            }
            OrderIndex::Unordered => {}
        }
    }

    fn clear(&mut self) {
        match self {
            OrderIndex::Recency(lru) => lru.clear(),
            OrderIndex::Frequency(lfu) => lfu.clear(),
            OrderIndex::Unordered => {}
        }
    }
}

// == Cache Store ==
/// Entry storage with policy-shaped ordering and counters.
#[derive(Debug)]
pub struct CacheStore<K, V> {
    /// Key -> entry storage
    entries: HashMap<K, CacheEntry<V>>,
    /// Policy ordering index
    index: OrderIndex<K>,
    /// Performance statistics
    stats: CacheStats,
    /// Next admission sequence number
    next_seq: u64,
}

impl<K: Hash + Eq + Clone, V> CacheStore<K, V> {
    // == Constructor ==
    /// Creates an empty store whose index matches `config.policy`.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            index: OrderIndex::for_policy(config.policy),
            stats: CacheStats::new(config),
            next_seq: 0,
        }
    }

    // == Lookup ==
    /// Returns the entry for `key` without touching it.
    pub fn lookup(&self, key: &K) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    // == Insert ==
    /// Admits a value at `now`.
    ///
    /// A new key gets an access count of 1. An existing key has its value
    /// replaced and counts as an access: its history is kept, LRU moves it
    /// to most recent and LFU bumps its frequency.
    pub fn insert(&mut self, key: K, value: V, now: Instant) {
        if let Some(entry) = self.entries.get_mut(&key) {
            self.index.touch(&key, entry);
            entry.value = value;
            entry.touch(now);
            return;
        }

        let mut entry = CacheEntry::new(value, now);
        entry.seq = self.next_seq;
        self.next_seq += 1;
        self.index.admit(&key, &entry);
        self.entries.insert(key, entry);
    }

    // == Touch ==
    /// Records a hit on `key` and returns its entry, or None if absent.
    pub fn touch(&mut self, key: &K, now: Instant) -> Option<&CacheEntry<V>> {
        let entry = self.entries.get_mut(key)?;
        self.index.touch(key, entry);
        entry.touch(now);
        Some(entry)
    }

    // == Remove ==
    /// Removes an entry from both the mapping and the index.
    pub fn remove(&mut self, key: &K) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(key)?;
        self.index.remove(key, &entry);
        Some(entry)
    }

    // == Remove Expired ==
    /// Removes every entry idle for longer than `ttl`.
    ///
    /// Returns the number of entries removed.
    pub fn remove_expired(&mut self, now: Instant, ttl: Duration) -> usize {
        let expired_keys: Vec<K> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now, ttl))
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();

        for key in expired_keys {
            self.remove(&key);
        }

        self.stats.record_expirations(count);
        count
    }

    // == Eviction Candidate ==
    /// The key the built-in policies would evict next.
    ///
    /// LRU: least recently used. LFU: least frequently used, oldest
    /// admission first. Unordered: the idlest entry, oldest admission first.
    pub fn eviction_candidate(&self) -> Option<K> {
        match &self.index {
            OrderIndex::Recency(lru) => lru.peek_oldest().cloned(),
            OrderIndex::Frequency(lfu) => lfu.peek_least_frequent().cloned(),
            OrderIndex::Unordered => self
                .entries
                .iter()
                .min_by_key(|(_, entry)| (entry.last_accessed_at, entry.seq))
                .map(|(key, _)| key.clone()),
        }
    }

    // == Iteration ==
    /// Iterates over live entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &CacheEntry<V>)> {
        self.entries.iter()
    }

    /// Access count of a live entry.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.entries.get(key).map(|entry| entry.access_count)
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Counts entries that are not yet expired at `now`, without removing
    /// the stale ones.
    pub fn live_len(&self, now: Instant, ttl: Duration) -> usize {
        self.entries
            .values()
            .filter(|entry| !entry.is_expired(now, ttl))
            .count()
    }

    // == Clear ==
    /// Drops all entries, index state and counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.stats.reset();
        self.next_seq = 0;
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_size(self.entries.len());
        stats
    }

    pub(crate) fn record_hit(&mut self) {
        self.stats.record_hit();
    }

    pub(crate) fn record_miss(&mut self) {
        self.stats.record_miss();
    }

    pub(crate) fn record_eviction(&mut self) {
        self.stats.record_eviction();
    }

    /// Checks that the index tracks exactly the keys of the mapping.
    #[cfg(test)]
    pub(crate) fn is_consistent(&self) -> bool {
        match &self.index {
            OrderIndex::Recency(lru) => {
                lru.len() == self.entries.len()
                    && self.entries.keys().all(|key| lru.contains(key))
            }
            OrderIndex::Frequency(lfu) => {
                lfu.len() == self.entries.len()
                    && self
                        .entries
                        .iter()
                        .all(|(key, entry)| lfu.holds(entry.rank(), key))
            }
            OrderIndex::Unordered => true,
        }
    }
}
