//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with access metadata.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// Represents a single cached result with its access metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The cached result
    pub value: V,
    /// When the entry was first admitted
    pub inserted_at: Instant,
    /// Last hit (or admission) time
    pub last_accessed_at: Instant,
    /// Number of accesses, admission included
    pub access_count: u64,
    /// Admission order within the owning store
    pub(crate) seq: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry admitted at `now` with an access count of 1.
    pub fn new(value: V, now: Instant) -> Self {
        Self {
            value,
            inserted_at: now,
            last_accessed_at: now,
            access_count: 1,
            seq: 0,
        }
    }

    // == Touch ==
    /// Records a hit at `now`.
    pub fn touch(&mut self, now: Instant) {
        self.last_accessed_at = now;
        self.access_count += 1;
    }

    /// Position in the LFU order: `(access_count, seq)`.
    pub(crate) fn rank(&self) -> (u64, u64) {
        (self.access_count, self.seq)
    }

    // == Idle Time ==
    /// Time elapsed since the last access.
    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_accessed_at)
    }

    // == Is Expired ==
    /// Checks if the entry has been idle for longer than `ttl`.
    ///
    /// Boundary condition: an entry idle for exactly `ttl` is still live;
    /// expiry requires strictly more.
    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        self.idle_for(now) > ttl
    }

    // == Time To Live ==
    /// Remaining idle time before expiry, zero once expired.
    pub fn ttl_remaining(&self, now: Instant, ttl: Duration) -> Duration {
        ttl.saturating_sub(self.idle_for(now))
    }
}
