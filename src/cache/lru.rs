//! LRU Tracker Module
//!
//! Recency ordering for least-recently-used eviction.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

// == LRU Tracker ==
/// Orders keys by their last use.
///
/// Every touch stamps the key with a fresh tick. The ordered index maps
/// ticks back to keys, so its first element is the least recently used key.
#[derive(Debug)]
pub struct LruTracker<K> {
    /// key -> tick of last use
    stamps: HashMap<K, u64>,
    /// tick -> key, oldest first
    order: BTreeMap<u64, K>,
    tick: u64,
}

impl<K> Default for LruTracker<K> {
    fn default() -> Self {
        Self {
            stamps: HashMap::new(),
            order: BTreeMap::new(),
            tick: 0,
        }
    }
}

impl<K: Hash + Eq + Clone> LruTracker<K> {
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as the most recently used, tracking it if new.
    pub fn touch(&mut self, key: &K) {
        let tick = self.tick;
        self.tick += 1;

        match self.stamps.insert(key.clone(), tick) {
            Some(previous) => {
                if let Some(k) = self.order.remove(&previous) {
                    self.order.insert(tick, k);
                }
            }
            None => {
                self.order.insert(tick, key.clone());
            }
        }
    }

    /// Stops tracking a key. Untracked keys are ignored.
    pub fn remove(&mut self, key: &K) {
        if let Some(tick) = self.stamps.remove(key) {
            self.order.remove(&tick);
        }
    }

    /// The least recently used key.
    pub fn peek_oldest(&self) -> Option<&K> {
        self.order.values().next()
    }

    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.stamps.contains_key(key)
    }

    /// Drops every key. Ticks keep increasing across clears.
    pub fn clear(&mut self) {
        self.stamps.clear();
        self.order.clear();
    }
}
