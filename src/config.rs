//! Configuration Module
//!
//! Cache construction parameters, loadable from environment variables.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{MemoError, Result};

// == Policy Kind ==
/// Selects the eviction strategy of a cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Least recently used
    #[default]
    Lru,
    /// Least frequently used
    Lfu,
    /// Idle expiry only
    Ttl,
    /// Caller-supplied eviction function
    Custom,
}

impl PolicyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyKind::Lru => "lru",
            PolicyKind::Lfu => "lfu",
            PolicyKind::Ttl => "ttl",
            PolicyKind::Custom => "custom",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyKind {
    type Err = MemoError;

    /// Parses a policy name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lru" => Ok(PolicyKind::Lru),
            "lfu" => Ok(PolicyKind::Lfu),
            "ttl" => Ok(PolicyKind::Ttl),
            "custom" => Ok(PolicyKind::Custom),
            _ => Err(MemoError::UnknownPolicy(s.to_string())),
        }
    }
}

// == Cache Config ==
/// Cache configuration parameters.
///
/// Immutable once a cache has been built from it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries, None = unbounded
    pub max_size: Option<usize>,
    /// Eviction strategy
    pub policy: PolicyKind,
    /// Idle expiry window in seconds, None = no expiry
    pub ttl_seconds: Option<f64>,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MEMO_MAX_SIZE` - Maximum cache entries (default: unbounded)
    /// - `MEMO_POLICY` - One of lru, lfu, ttl, custom (default: lru)
    /// - `MEMO_TTL_SECONDS` - Idle expiry in seconds (default: none)
    ///
    /// Unparseable numbers fall back to the default. An unknown policy name
    /// is an error.
    pub fn from_env() -> Result<Self> {
        let policy = match env::var("MEMO_POLICY") {
            Ok(name) => name.parse()?,
            Err(_) => PolicyKind::default(),
        };

        Ok(Self {
            max_size: env::var("MEMO_MAX_SIZE")
                .ok()
                .and_then(|v| v.parse().ok()),
            policy,
            ttl_seconds: env::var("MEMO_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok()),
        })
    }

    /// Checks the parameters for misconfiguration.
    ///
    /// The eviction function pairing is checked by the builder, which is the
    /// only place that sees both.
    pub fn validate(&self) -> Result<()> {
        if self.max_size == Some(0) {
            return Err(MemoError::InvalidMaxSize(0));
        }
        if let Some(ttl) = self.ttl_seconds {
            if !ttl.is_finite() || ttl <= 0.0 {
                return Err(MemoError::InvalidTtl(ttl));
            }
        }
        if self.policy == PolicyKind::Ttl && self.ttl_seconds.is_none() {
            return Err(MemoError::MissingTtl);
        }
        Ok(())
    }

    /// The idle expiry window as a Duration.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_seconds
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.max_size, None);
        assert_eq!(config.policy, PolicyKind::Lru);
        assert_eq!(config.ttl_seconds, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_env() {
        env::set_var("MEMO_MAX_SIZE", "3");
        env::set_var("MEMO_POLICY", "LFU");
        env::set_var("MEMO_TTL_SECONDS", "2.5");

        let config = CacheConfig::from_env().unwrap();
        assert_eq!(config.max_size, Some(3));
        assert_eq!(config.policy, PolicyKind::Lfu);
        assert_eq!(config.ttl_seconds, Some(2.5));

        env::set_var("MEMO_POLICY", "mru");
        assert!(matches!(
            CacheConfig::from_env(),
            Err(MemoError::UnknownPolicy(_))
        ));

        env::remove_var("MEMO_MAX_SIZE");
        env::remove_var("MEMO_POLICY");
        env::remove_var("MEMO_TTL_SECONDS");

        assert_eq!(CacheConfig::from_env().unwrap(), CacheConfig::default());
    }

    #[test]
    fn test_policy_parse_ignores_case() {
        assert_eq!("LRU".parse::<PolicyKind>().unwrap(), PolicyKind::Lru);
        assert_eq!("Custom".parse::<PolicyKind>().unwrap(), PolicyKind::Custom);
        assert_eq!(PolicyKind::Ttl.to_string(), "ttl");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let zero = CacheConfig {
            max_size: Some(0),
            ..Default::default()
        };
        assert_eq!(zero.validate(), Err(MemoError::InvalidMaxSize(0)));

        for ttl in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = CacheConfig {
                ttl_seconds: Some(ttl),
                ..Default::default()
            };
            assert!(matches!(config.validate(), Err(MemoError::InvalidTtl(_))));
        }

        let ttl_only = CacheConfig {
            policy: PolicyKind::Ttl,
            ..Default::default()
        };
        assert_eq!(ttl_only.validate(), Err(MemoError::MissingTtl));
    }

    #[test]
    fn test_ttl_duration() {
        let config = CacheConfig {
            ttl_seconds: Some(1.5),
            ..Default::default()
        };
        assert_eq!(config.ttl(), Some(Duration::from_millis(1500)));
        assert_eq!(CacheConfig::default().ttl(), None);
    }

    #[test]
    fn test_config_serializes_policy_lowercase() {
        let config = CacheConfig {
            max_size: Some(10),
            policy: PolicyKind::Lfu,
            ttl_seconds: None,
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["policy"], "lfu");
        assert_eq!(json["max_size"], 10);
    }
}
