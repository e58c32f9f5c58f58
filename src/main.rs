//! memocache demo
//!
//! Runs a memoized recursive Fibonacci under the cache policy configured
//! through environment variables, then prints the cache statistics.
//!
//! # Usage
//! ```text
//! MEMO_MAX_SIZE=3 MEMO_POLICY=lfu memocache 10 20 30
//! ```

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use memocache::{CacheConfig, CacheKey, EvictionView, Memoizer, MemoizerBuilder, PolicyKind};

fn main() -> Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "memocache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CacheConfig::from_env().context("failed to load cache configuration")?;
    info!(
        "Configuration loaded: max_size={:?}, policy={}, ttl_seconds={:?}",
        config.max_size, config.policy, config.ttl_seconds
    );

    let inputs = parse_inputs(std::env::args().skip(1))?;
    let fib = build_fibonacci(config).context("failed to build memoizer")?;

    for n in inputs {
        let value = fib.call(n)?;
        println!("fib({}) = {}", n, value);
    }

    let stats = fib.stats();
    println!("{}", serde_json::to_string_pretty(&stats)?);
    info!("Hit rate: {:.2}", stats.hit_rate());

    Ok(())
}

/// Parses the Fibonacci inputs, defaulting to a small demo set.
fn parse_inputs(args: impl Iterator<Item = String>) -> Result<Vec<u64>> {
    let inputs = args
        .map(|arg| {
            arg.parse::<u64>()
                .with_context(|| format!("invalid input '{}'", arg))
        })
        .collect::<Result<Vec<_>>>()?;

    if inputs.is_empty() {
        Ok(vec![10, 20, 30])
    } else {
        Ok(inputs)
    }
}

fn build_fibonacci(config: CacheConfig) -> memocache::error::Result<Memoizer<u64, u64>> {
    let custom = config.policy == PolicyKind::Custom;
    let builder = MemoizerBuilder::from_config(config);

    if custom {
        builder.evict_with(evict_smallest_value).build(fibonacci)
    } else {
        builder.build(fibonacci)
    }
}

fn fibonacci(memo: &Memoizer<u64, u64>, key: &CacheKey<u64>) -> memocache::error::Result<u64> {
    let n = key.arg(0).copied().unwrap_or(0);
    if n <= 1 {
        return Ok(n);
    }
    Ok(memo.call(n - 1)?.saturating_add(memo.call(n - 2)?))
}

/// Custom strategy: drop the entry holding the smallest result.
fn evict_smallest_value(view: &mut EvictionView<'_, CacheKey<u64>, u64>) {
    let victim = view
        .entries()
        .min_by_key(|(_, entry)| entry.value)
        .map(|(key, _)| key.clone());

    if let Some(key) = victim {
        view.remove(&key);
    }
}
