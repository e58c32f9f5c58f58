//! Cache Module
//!
//! Entry storage, policy ordering indexes and the eviction policies.

mod entry;
mod lfu;
mod lru;
mod policy;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use lfu::LfuTracker;
pub use lru::LruTracker;
pub use policy::{EvictFn, EvictionView, Policy};
pub use stats::CacheStats;
pub use store::CacheStore;
