//! Content cache configuration.

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Deserialize;

const DEFAULT_TTL_SECONDS: u64 = 300;
const DEFAULT_POST_LIMIT: usize = 200;
const DEFAULT_PROJECT_LIMIT: usize = 100;

/// Cache behavior, resolved from the `[cache]` settings section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable the content cache; when off every request hits the CMS.
    pub enabled: bool,
    /// Freshness window in seconds; stale entries are refetched on read.
    pub ttl_seconds: u64,
    /// Maximum posts held in the slug-keyed LRU map.
    pub post_limit: usize,
    /// Maximum projects held in the slug-keyed LRU map.
    pub project_limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: DEFAULT_TTL_SECONDS,
            post_limit: DEFAULT_POST_LIMIT,
            project_limit: DEFAULT_PROJECT_LIMIT,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    pub fn post_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.post_limit).unwrap_or(NonZeroUsize::MIN)
    }

    pub fn project_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.project_limit).unwrap_or(NonZeroUsize::MIN)
    }
}
