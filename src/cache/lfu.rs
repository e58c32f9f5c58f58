//! LFU Tracker Module
//!
//! Frequency ordering for least-frequently-used eviction.

use std::collections::BTreeMap;

/// Position of a key in the frequency order: `(frequency, admission seq)`.
///
/// Both halves come from the key's [`CacheEntry`](crate::cache::CacheEntry);
/// the tracker holds no counts of its own.
pub type Rank = (u64, u64);

// == LFU Tracker ==
/// Orders keys by access frequency, oldest admission first among ties.
///
/// The first element of the index is the least frequently used key.
#[derive(Debug)]
pub struct LfuTracker<K> {
    order: BTreeMap<Rank, K>,
}

impl<K> Default for LfuTracker<K> {
    fn default() -> Self {
        Self {
            order: BTreeMap::new(),
        }
    }
}

impl<K: PartialEq> LfuTracker<K> {
    pub fn new() -> Self {
        Self::default()
    }

    // == Insert ==
    /// Starts tracking `key` at `rank`.
    pub fn insert(&mut self, rank: Rank, key: K) {
        self.order.insert(rank, key);
    }

    // == Promote ==
    /// Moves the key at `rank` up by one access. Unknown ranks are ignored.
    pub fn promote(&mut self, rank: Rank) {
        let (freq, seq) = rank;
        if let Some(key) = self.order.remove(&rank) {
            self.order.insert((freq + 1, seq), key);
        }
    }

    // == Remove ==
    pub fn remove(&mut self, rank: Rank) -> Option<K> {
        self.order.remove(&rank)
    }

    // == Peek Least Frequent ==
    /// Returns the eviction candidate without removing it.
    pub fn peek_least_frequent(&self) -> Option<&K> {
        self.order.values().next()
    }

    /// Checks that `key` is tracked at exactly `rank`.
    pub fn holds(&self, rank: Rank, key: &K) -> bool {
        self.order.get(&rank) == Some(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }
}
