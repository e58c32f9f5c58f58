//! Cache Statistics Module
//!
//! Read-only snapshot of cache configuration, occupancy and counters.

use serde::Serialize;

use crate::config::{CacheConfig, PolicyKind};

// == Cache Stats ==
/// Tracks cache occupancy and performance metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    /// Current number of live entries
    pub size: usize,
    /// Configured capacity bound
    pub max_size: Option<usize>,
    /// Active eviction policy
    pub policy: PolicyKind,
    /// Configured idle expiry window
    pub ttl_seconds: Option<f64>,
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that ran the computation
    pub misses: u64,
    /// Entries removed to satisfy the capacity bound
    pub evictions: u64,
    /// Entries removed by the expiry sweep
    pub expirations: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates empty stats for a cache built from `config`.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            size: 0,
            max_size: config.max_size,
            policy: config.policy,
            ttl_seconds: config.ttl_seconds,
            hits: 0,
            misses: 0,
            evictions: 0,
            expirations: 0,
        }
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    pub fn set_size(&mut self, size: usize) {
        self.size = size;
    }

    /// Zeroes counters and size, keeping the configuration fields.
    pub fn reset(&mut self) {
        self.size = 0;
        self.hits = 0;
        self.misses = 0;
        self.evictions = 0;
        self.expirations = 0;
    }
}
