//! Eviction Policy Module
//!
//! The closed set of eviction strategies and the two hook points the
//! memoizer drives them through: `on_access` and
//! `on_insert_then_maybe_evict`.

use std::fmt;
use std::hash::Hash;
use std::time::Instant;

use tracing::{debug, warn};

use crate::cache::{CacheEntry, CacheStore};
use crate::config::{CacheConfig, PolicyKind};
use crate::error::{MemoError, Result};

/// Caller-supplied eviction strategy.
///
/// Invoked once per overflow; must remove exactly one entry through
/// [`EvictionView::remove`].
pub type EvictFn<K, V> = Box<dyn Fn(&mut EvictionView<'_, K, V>)>;

// == Eviction View ==
/// What a custom eviction function sees: the live entries, their access
/// frequencies, and a removal operation that keeps the store consistent.
pub struct EvictionView<'a, K, V> {
    store: &'a mut CacheStore<K, V>,
}

impl<K: Hash + Eq + Clone, V> EvictionView<'_, K, V> {
    /// Live entries in arbitrary order.
    pub fn entries(&self) -> impl Iterator<Item = (&K, &CacheEntry<V>)> {
        self.store.iter()
    }

    /// Access frequency of every live entry.
    pub fn frequencies(&self) -> impl Iterator<Item = (&K, u64)> {
        self.store.iter().map(|(key, entry)| (key, entry.access_count))
    }

    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.store.frequency(key)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Evicts `key`, returning its value if it was present.
    ///
    /// The eviction is counted once the function returns having removed
    /// exactly one entry.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.store.remove(key).map(|entry| entry.value)
    }
}

// == Policy ==
/// Eviction strategy, selected once at construction.
pub enum Policy<K, V> {
    /// Evict the least recently used entry
    Lru,
    /// Evict the least frequently used entry, oldest admission on ties
    Lfu,
    /// Idle expiry; on overflow evict the idlest entry
    Ttl,
    /// Delegate the choice to a caller-supplied function
    Custom(EvictFn<K, V>),
}

impl<K, V> fmt::Debug for Policy<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Lru => f.write_str("Lru"),
            Policy::Lfu => f.write_str("Lfu"),
            Policy::Ttl => f.write_str("Ttl"),
            Policy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl<K: Hash + Eq + Clone, V> Policy<K, V> {
    /// Builds the policy named by `config`.
    ///
    /// The eviction function is required for, and only accepted with, the
    /// custom policy.
    pub fn from_config(config: &CacheConfig, evict: Option<EvictFn<K, V>>) -> Result<Self> {
        match (config.policy, evict) {
            (PolicyKind::Custom, Some(f)) => Ok(Policy::Custom(f)),
            (PolicyKind::Custom, None) => Err(MemoError::MissingEvictionFn),
            (kind, Some(_)) => Err(MemoError::UnexpectedEvictionFn(kind.to_string())),
            (PolicyKind::Lru, None) => Ok(Policy::Lru),
            (PolicyKind::Lfu, None) => Ok(Policy::Lfu),
            (PolicyKind::Ttl, None) => Ok(Policy::Ttl),
        }
    }

    pub fn kind(&self) -> PolicyKind {
        match self {
            Policy::Lru => PolicyKind::Lru,
            Policy::Lfu => PolicyKind::Lfu,
            Policy::Ttl => PolicyKind::Ttl,
            Policy::Custom(_) => PolicyKind::Custom,
        }
    }

    // == On Access ==
    /// Hit bookkeeping: refreshes recency, bumps frequency.
    ///
    /// Returns the entry, or None on a miss.
    pub fn on_access<'s>(
        &self,
        store: &'s mut CacheStore<K, V>,
        key: &K,
        now: Instant,
    ) -> Option<&'s CacheEntry<V>> {
        store.touch(key, now)
    }

    // == On Insert ==
    /// Admits a freshly computed value, then evicts one entry if the store
    /// has grown past `max_size`.
    ///
    /// The new entry itself may be the victim, e.g. under LFU when every
    /// other entry has been accessed more often. If a custom function breaks
    /// its contract the new entry is withdrawn again before the error is
    /// returned, leaving the store within capacity.
    pub fn on_insert_then_maybe_evict(
        &self,
        store: &mut CacheStore<K, V>,
        key: K,
        value: V,
        now: Instant,
        max_size: Option<usize>,
    ) -> Result<()> {
        let over = |len: usize| max_size.is_some_and(|max| len > max);

        if let Policy::Custom(evict) = self {
            let admitted = key.clone();
            store.insert(key, value, now);
            if over(store.len()) {
                return Self::evict_custom(evict, store, &admitted);
            }
            return Ok(());
        }

        store.insert(key, value, now);
        if over(store.len()) {
            self.evict_builtin(store);
        }
        Ok(())
    }

    // == Evict ==
    fn evict_builtin(&self, store: &mut CacheStore<K, V>) {
        if let Some(victim) = store.eviction_candidate() {
            store.remove(&victim);
            store.record_eviction();
            debug!(policy = %self.kind(), size = store.len(), "evicted entry");
        }
    }

    fn evict_custom(
        evict: &EvictFn<K, V>,
        store: &mut CacheStore<K, V>,
        admitted: &K,
    ) -> Result<()> {
        let before = store.len();
        evict(&mut EvictionView { store: &mut *store });
        let removed = before.saturating_sub(store.len());

        if removed != 1 {
            store.remove(admitted);
            warn!(
                removed,
                size = store.len(),
                "custom eviction function broke its contract"
            );
            return Err(MemoError::EvictionContract { removed });
        }

        store.record_eviction();
        debug!(policy = "custom", size = store.len(), "evicted entry");
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn setup(
        kind: PolicyKind,
        evict: Option<EvictFn<&'static str, i32>>,
    ) -> (Policy<&'static str, i32>, CacheStore<&'static str, i32>) {
        let config = CacheConfig {
            max_size: Some(3),
            policy: kind,
            ttl_seconds: None,
        };
        let policy = Policy::from_config(&config, evict).unwrap();
        (policy, CacheStore::new(&config))
    }

    fn fill(
        policy: &Policy<&'static str, i32>,
        store: &mut CacheStore<&'static str, i32>,
        keys: &[&'static str],
        now: Instant,
    ) {
        for (i, key) in keys.iter().enumerate() {
            policy
                .on_insert_then_maybe_evict(store, *key, i as i32, now, Some(3))
                .unwrap();
        }
    }

    #[test]
    fn test_custom_requires_function() {
        let config = CacheConfig {
            policy: PolicyKind::Custom,
            ..Default::default()
        };
        let result = Policy::<&str, i32>::from_config(&config, None);
        assert!(matches!(result, Err(MemoError::MissingEvictionFn)));
    }

    #[test]
    fn test_function_rejected_for_builtin_policy() {
        let config = CacheConfig::default();
        let evict: EvictFn<&str, i32> = Box::new(|_| {});
        let result = Policy::from_config(&config, Some(evict));
        assert!(matches!(result, Err(MemoError::UnexpectedEvictionFn(_))));
    }

    #[test]
    fn test_lru_evicts_least_recent() {
        let (policy, mut store) = setup(PolicyKind::Lru, None);
        let now = Instant::now();
        fill(&policy, &mut store, &["a", "b", "c"], now);

        assert!(policy.on_access(&mut store, &"a", now).is_some());
        fill(&policy, &mut store, &["d"], now);

        assert_eq!(store.len(), 3);
        assert!(!store.contains(&"b"));
        assert!(store.contains(&"a"));
        assert_eq!(store.stats().evictions, 1);
        assert!(store.is_consistent());
    }

    #[test]
    fn test_lfu_evicts_least_frequent() {
        let (policy, mut store) = setup(PolicyKind::Lfu, None);
        let now = Instant::now();
        fill(&policy, &mut store, &["a", "b", "c"], now);

        policy.on_access(&mut store, &"a", now);
        policy.on_access(&mut store, &"a", now);
        policy.on_access(&mut store, &"b", now);
        fill(&policy, &mut store, &["d"], now);

        assert!(!store.contains(&"c"));
        assert!(store.contains(&"d"));
        assert!(store.is_consistent());
    }

    #[test]
    fn test_lfu_can_evict_new_entry() {
        let (policy, mut store) = setup(PolicyKind::Lfu, None);
        let now = Instant::now();
        fill(&policy, &mut store, &["a", "b", "c"], now);
        for key in ["a", "b", "c"] {
            policy.on_access(&mut store, &key, now);
        }

        fill(&policy, &mut store, &["d"], now);

        assert!(!store.contains(&"d"));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_ttl_policy_evicts_idlest() {
        let (policy, mut store) = setup(PolicyKind::Ttl, None);
        let start = Instant::now();
        fill(&policy, &mut store, &["a", "b", "c"], start);

        policy.on_access(&mut store, &"a", start + Duration::from_secs(1));
        fill(&policy, &mut store, &["d"], start + Duration::from_secs(2));

        assert!(!store.contains(&"b"));
        assert!(store.contains(&"a"));
    }

    #[test]
    fn test_custom_evicts_chosen_entry() {
        let evict: EvictFn<&'static str, i32> = Box::new(|view| {
            let victim = view
                .entries()
                .max_by_key(|(_, entry)| entry.value)
                .map(|(key, _)| *key);
            if let Some(key) = victim {
                view.remove(&key);
            }
        });
        let (policy, mut store) = setup(PolicyKind::Custom, Some(evict));
        let now = Instant::now();

        fill(&policy, &mut store, &["a", "b", "c", "d"], now);

        // "d" held the largest value (3)
        assert!(!store.contains(&"d"));
        assert_eq!(store.len(), 3);
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_custom_contract_violation() {
        let evict: EvictFn<&'static str, i32> = Box::new(|_| {});
        let (policy, mut store) = setup(PolicyKind::Custom, Some(evict));
        let now = Instant::now();
        fill(&policy, &mut store, &["a", "b", "c"], now);

        let result = policy.on_insert_then_maybe_evict(&mut store, "d", 9, now, Some(3));
        assert_eq!(result, Err(MemoError::EvictionContract { removed: 0 }));

        // The rejected entry is withdrawn and the store stays within bounds
        assert!(!store.contains(&"d"));
        assert_eq!(store.len(), 3);
        assert_eq!(store.stats().evictions, 0);
        assert!(store.is_consistent());

        let again = policy.on_insert_then_maybe_evict(&mut store, "e", 9, now, Some(3));
        assert!(again.is_err());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_custom_removing_two_is_violation() {
        let evict: EvictFn<&'static str, i32> = Box::new(|view| {
            let keys: Vec<&'static str> = view.entries().map(|(k, _)| *k).take(2).collect();
            for key in keys {
                view.remove(&key);
            }
        });
        let (policy, mut store) = setup(PolicyKind::Custom, Some(evict));
        let now = Instant::now();
        fill(&policy, &mut store, &["a", "b", "c"], now);

        let result = policy.on_insert_then_maybe_evict(&mut store, "d", 9, now, Some(3));
        assert_eq!(result, Err(MemoError::EvictionContract { removed: 2 }));

        assert!(!store.contains(&"d"));
        assert_eq!(store.len(), 2);
        assert_eq!(store.stats().evictions, 0);
    }

    #[test]
    fn test_eviction_view_frequencies() {
        let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink = seen.clone();
        let evict: EvictFn<&'static str, i32> = Box::new(move |view| {
            let mut freqs: Vec<(&'static str, u64)> =
                view.frequencies().map(|(k, f)| (*k, f)).collect();
            freqs.sort();
            *sink.borrow_mut() = freqs;
            view.remove(&"a");
        });
        let (policy, mut store) = setup(PolicyKind::Custom, Some(evict));
        let now = Instant::now();
        fill(&policy, &mut store, &["a", "b", "c"], now);
        policy.on_access(&mut store, &"b", now);

        fill(&policy, &mut store, &["d"], now);

        assert_eq!(
            *seen.borrow(),
            vec![("a", 1), ("b", 2), ("c", 1), ("d", 1)]
        );
        assert!(!store.contains(&"a"));
    }

    #[test]
    fn test_unbounded_never_evicts() {
        let (policy, mut store) = setup(PolicyKind::Lru, None);
        let now = Instant::now();
        for (i, key) in ["a", "b", "c", "d", "e", "f"].into_iter().enumerate() {
            policy
                .on_insert_then_maybe_evict(&mut store, key, i as i32, now, None)
                .unwrap();
        }
        assert_eq!(store.len(), 6);
        assert_eq!(store.stats().evictions, 0);
    }
}
