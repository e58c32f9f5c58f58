//! memocache - A memoizing cache with pluggable eviction
//!
//! Wraps a computation and caches its results by canonicalized arguments,
//! with LRU, LFU, idle-expiry (TTL) or caller-supplied eviction.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod key;
pub mod memoizer;

pub use cache::{CacheEntry, CacheStats, EvictionView};
pub use clock::{Clock, MockClock, SystemClock};
pub use config::{CacheConfig, PolicyKind};
pub use error::MemoError;
pub use key::{ArgValue, CacheKey};
pub use memoizer::{Memoizer, MemoizerBuilder};
