//! Time-bounded explanation cache.
//!
//! [`ExplanationCache`] memoizes validated explanations keyed by
//! (selected text, style, model). All three parts feed the key: an entry
//! produced by one model or style is never returned for another.
//!
//! Expiry is TTL-based and enforced on read by moka; a background sweeper
//! runs moka's pending maintenance on a fixed interval so memory stays
//! bounded even when nothing reads the cache. The cache is an explicitly
//! constructed, injected service object whose lifetime is the process —
//! no ambient globals.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::telemetry;
use crate::types::Style;

/// Configuration for the explanation cache.
///
/// ```rust
/// # use scholia::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .max_entries(500)
///     .ttl(Duration::from_secs(600));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached explanations. Default: 1,000.
    pub max_entries: u64,
    /// Time-to-live for cached entries. Default: 30 minutes.
    pub ttl: Duration,
    /// How often the background sweeper runs. Default: 1 hour.
    pub sweep_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1_000,
            ttl: Duration::from_secs(30 * 60),
            sweep_interval: Duration::from_secs(3600),
        }
    }
}

impl CacheConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached entries.
    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = n;
        self
    }

    /// Set the time-to-live for cached entries.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the sweep interval for the background eviction task.
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }
}

/// In-memory TTL cache of validated explanations.
pub struct ExplanationCache {
    cache: Cache<u64, String>,
}

impl ExplanationCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(config.ttl)
            .build();
        Self { cache }
    }

    /// Look up a cached explanation.
    ///
    /// Returns `None` on miss or when the entry's TTL has elapsed, even if
    /// the sweeper has not run yet. Emits cache hit/miss metrics.
    pub async fn get(&self, selected_text: &str, style: Style, model: &str) -> Option<String> {
        let key = cache_key(selected_text, style, model);
        match self.cache.get(&key).await {
            Some(text) => {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
                Some(text)
            }
            None => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
                None
            }
        }
    }

    /// Store a validated explanation.
    pub async fn insert(&self, selected_text: &str, style: Style, model: &str, text: String) {
        let key = cache_key(selected_text, style, model);
        self.cache.insert(key, text).await;
    }

    /// Number of live entries (may include not-yet-swept expired ones).
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Run one maintenance pass, evicting everything past its TTL.
    pub async fn sweep(&self) {
        self.cache.run_pending_tasks().await;
    }

    /// Spawn the periodic sweeper. The task runs until the handle is
    /// aborted or the runtime shuts down.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // First tick completes immediately; skip it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                cache.sweep().await;
            }
        })
    }
}

/// Compute a cache key over the three identity parts.
///
/// `Hash` on `str` is length-prefixed, so adjacent parts cannot collide by
/// shifting characters between them. `DefaultHasher` is deterministic
/// within a process lifetime, which is all an in-memory cache needs.
fn cache_key(selected_text: &str, style: Style, model: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    selected_text.hash(&mut hasher);
    style.as_str().hash(&mut hasher);
    model.hash(&mut hasher);
    hasher.finish()
}
