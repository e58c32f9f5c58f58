//! Memoizer Module
//!
//! The public entry point: wraps a computation, canonicalizes each call's
//! arguments, answers hits from the store and runs the computation on
//! misses.

use std::cell::RefCell;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, trace};

use crate::cache::{CacheStats, CacheStore, EvictFn, EvictionView, Policy};
use crate::clock::{Clock, SystemClock};
use crate::config::{CacheConfig, PolicyKind};
use crate::error::MemoError;
use crate::key::CacheKey;

/// The wrapped computation.
///
/// Receives the memoizer itself so recursive functions can route their
/// sub-calls through the same cache.
pub type Computation<A, V, E> = Box<dyn Fn(&Memoizer<A, V, E>, &CacheKey<A>) -> Result<V, E>>;

// == Memoizer ==
/// A memoized computation with a bounded, policy-driven cache.
///
/// Single-threaded: the store lives in a `RefCell` whose borrow is released
/// before the computation runs, so a computation may re-enter
/// [`Memoizer::get_or_compute`] on the same call stack.
///
/// # Example
/// ```
/// use memocache::Memoizer;
///
/// let fib = Memoizer::<u64, u64>::builder()
///     .max_size(64)
///     .build(|memo, key| {
///         let n = key.args()[0];
///         if n <= 1 {
///             Ok(n)
///         } else {
///             Ok(memo.call(n - 1)? + memo.call(n - 2)?)
///         }
///     })
///     .unwrap();
///
/// assert_eq!(fib.call(50).unwrap(), 12_586_269_025);
/// ```
pub struct Memoizer<A, V, E = MemoError> {
    compute: Computation<A, V, E>,
    config: CacheConfig,
    ttl: Option<Duration>,
    policy: Policy<CacheKey<A>, V>,
    store: RefCell<CacheStore<CacheKey<A>, V>>,
    clock: Rc<dyn Clock>,
}

impl<A, V> Memoizer<A, V, MemoError>
where
    A: Hash + Eq + Clone,
    V: Clone,
{
    /// Starts a builder for a memoizer whose computation fails with
    /// [`MemoError`]. Use [`MemoizerBuilder::new`] for other error types.
    pub fn builder() -> MemoizerBuilder<A, V, MemoError> {
        MemoizerBuilder::new()
    }
}

impl<A, V, E> Memoizer<A, V, E>
where
    A: Hash + Eq + Clone,
    V: Clone,
    E: From<MemoError>,
{
    // == Constructor ==
    /// Creates a memoizer from a config.
    ///
    /// Fails for a custom policy, which needs an eviction function; use the
    /// builder's `evict_with` for that.
    pub fn new<F>(config: CacheConfig, compute: F) -> crate::error::Result<Self>
    where
        F: Fn(&Self, &CacheKey<A>) -> Result<V, E> + 'static,
    {
        MemoizerBuilder::from_config(config).build(compute)
    }

    // == Get Or Compute ==
    /// Returns the cached result for these arguments, computing and caching
    /// it on a miss.
    ///
    /// Computation errors propagate unchanged and nothing is cached.
    pub fn get_or_compute<N, S>(&self, positional: Vec<A>, named: N) -> Result<V, E>
    where
        N: IntoIterator<Item = (S, A)>,
        S: Into<String>,
    {
        self.get_or_compute_key(CacheKey::canonicalize(positional, named))
    }

    /// Shorthand for a call with a single positional argument.
    pub fn call(&self, arg: A) -> Result<V, E> {
        self.get_or_compute_key(CacheKey::positional(vec![arg]))
    }

    /// Looks up or computes an already canonicalized key.
    ///
    /// A computed entry is timestamped when the computation returns, so its
    /// idle window starts after the work is done.
    pub fn get_or_compute_key(&self, key: CacheKey<A>) -> Result<V, E> {
        {
            let mut store = self.store.borrow_mut();
            let now = self.clock.now();

            if let Some(ttl) = self.ttl {
                let expired = store.remove_expired(now, ttl);
                if expired > 0 {
                    debug!(expired, "removed idle entries");
                }
            }

            if let Some(entry) = self.policy.on_access(&mut store, &key, now) {
                let value = entry.value.clone();
                store.record_hit();
                trace!("cache hit");
                return Ok(value);
            }

            store.record_miss();
        }

        trace!("cache miss");
        let value = (self.compute)(self, &key)?;

        let now = self.clock.now();
        let mut store = self.store.borrow_mut();
        self.policy.on_insert_then_maybe_evict(
            &mut store,
            key,
            value.clone(),
            now,
            self.config.max_size,
        )?;

        Ok(value)
    }

    // == Contains ==
    /// Checks for a live cached result without touching it.
    pub fn contains<N, S>(&self, positional: Vec<A>, named: N) -> bool
    where
        N: IntoIterator<Item = (S, A)>,
        S: Into<String>,
    {
        let key = CacheKey::canonicalize(positional, named);
        let store = self.store.borrow();
        match (store.lookup(&key), self.ttl) {
            (Some(entry), Some(ttl)) => !entry.is_expired(self.clock.now(), ttl),
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    // == Invalidate ==
    /// Drops the cached result for these arguments.
    ///
    /// Returns true if an entry was removed.
    pub fn invalidate<N, S>(&self, positional: Vec<A>, named: N) -> bool
    where
        N: IntoIterator<Item = (S, A)>,
        S: Into<String>,
    {
        let key = CacheKey::canonicalize(positional, named);
        self.store.borrow_mut().remove(&key).is_some()
    }

    // == Stats ==
    /// Returns a snapshot of size, configuration and counters.
    ///
    /// `size` counts live entries only. Expired entries not yet swept are
    /// left alone.
    pub fn stats(&self) -> CacheStats {
        let store = self.store.borrow();
        let mut stats = store.stats();
        stats.set_size(self.live_len(&store));
        stats
    }

    // == Clear ==
    /// Drops every entry; the cache behaves as newly constructed.
    pub fn clear(&self) {
        self.store.borrow_mut().clear();
        debug!("cache cleared");
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.live_len(&self.store.borrow())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn policy(&self) -> PolicyKind {
        self.policy.kind()
    }

    fn live_len(&self, store: &CacheStore<CacheKey<A>, V>) -> usize {
        match self.ttl {
            Some(ttl) => store.live_len(self.clock.now(), ttl),
            None => store.len(),
        }
    }
}

impl<A, V, E> fmt::Debug for Memoizer<A, V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoizer")
            .field("config", &self.config)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

// == Memoizer Builder ==
/// Collects construction parameters and validates them in one place.
pub struct MemoizerBuilder<A, V, E = MemoError> {
    config: CacheConfig,
    evict: Option<EvictFn<CacheKey<A>, V>>,
    clock: Rc<dyn Clock>,
    _error: PhantomData<fn() -> E>,
}

impl<A, V, E> Default for MemoizerBuilder<A, V, E>
where
    A: Hash + Eq + Clone,
    V: Clone,
    E: From<MemoError>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<A, V, E> MemoizerBuilder<A, V, E>
where
    A: Hash + Eq + Clone,
    V: Clone,
    E: From<MemoError>,
{
    /// Unbounded LRU, no expiry, system clock.
    pub fn new() -> Self {
        Self::from_config(CacheConfig::default())
    }

    pub fn from_config(config: CacheConfig) -> Self {
        Self {
            config,
            evict: None,
            clock: Rc::new(SystemClock),
            _error: PhantomData,
        }
    }

    pub fn max_size(mut self, max_size: usize) -> Self {
        self.config.max_size = Some(max_size);
        self
    }

    pub fn policy(mut self, policy: PolicyKind) -> Self {
        self.config.policy = policy;
        self
    }

    /// Idle expiry window in seconds.
    pub fn ttl_seconds(mut self, secs: f64) -> Self {
        self.config.ttl_seconds = Some(secs);
        self
    }

    pub fn ttl(self, ttl: Duration) -> Self {
        self.ttl_seconds(ttl.as_secs_f64())
    }

    /// Installs a custom eviction function and selects the custom policy.
    pub fn evict_with<F>(mut self, evict: F) -> Self
    where
        F: Fn(&mut EvictionView<'_, CacheKey<A>, V>) + 'static,
    {
        self.config.policy = PolicyKind::Custom;
        self.evict = Some(Box::new(evict));
        self
    }

    pub fn clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Rc::new(clock);
        self
    }

    // == Build ==
    /// Validates the configuration and wraps `compute`.
    pub fn build<F>(self, compute: F) -> crate::error::Result<Memoizer<A, V, E>>
    where
        F: Fn(&Memoizer<A, V, E>, &CacheKey<A>) -> Result<V, E> + 'static,
    {
        self.config.validate()?;
        let policy = Policy::from_config(&self.config, self.evict)?;

        debug!(
            policy = %self.config.policy,
            max_size = ?self.config.max_size,
            ttl_seconds = ?self.config.ttl_seconds,
            "memoizer created"
        );

        Ok(Memoizer {
            compute: Box::new(compute),
            ttl: self.config.ttl(),
            policy,
            store: RefCell::new(CacheStore::new(&self.config)),
            config: self.config,
            clock: self.clock,
        })
    }
}
