//! Error types for the memoizing cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Memo Error Enum ==
/// Unified error type for cache construction and eviction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MemoError {
    /// Custom policy selected without an eviction function
    #[error("Custom eviction policy requires an eviction function")]
    MissingEvictionFn,

    /// Eviction function supplied for a built-in policy
    #[error("Eviction function supplied for non-custom policy '{0}'")]
    UnexpectedEvictionFn(String),

    /// Capacity bound must be a positive integer
    #[error("Invalid max size: {0} (must be positive)")]
    InvalidMaxSize(usize),

    /// TTL must be a positive, finite number of seconds
    #[error("Invalid TTL: {0} seconds (must be positive and finite)")]
    InvalidTtl(f64),

    /// TTL policy selected without a TTL
    #[error("TTL policy requires ttl_seconds to be set")]
    MissingTtl,

    /// Policy name could not be parsed
    #[error("Unknown eviction policy: {0}")]
    UnknownPolicy(String),

    /// Custom eviction function removed the wrong number of entries
    #[error("Eviction function removed {removed} entries, expected exactly 1")]
    EvictionContract { removed: usize },
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, MemoError>;
