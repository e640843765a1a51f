//! Vetrina content cache.
//!
//! A single in-memory layer between the HTTP handlers and the CMS:
//!
//! - **Singletons**: taxonomy listing, links page, recent posts/projects
//! - **Slug maps**: individual posts and projects (LRU-bounded)
//!
//! Entries expire after a configurable TTL and can be dropped eagerly through
//! the revalidate webhook. Behavior is controlled via `vetrina.toml`:
//!
//! ```toml
//! [cache]
//! enabled = true
//! ttl_seconds = 300
//! post_limit = 200
//! project_limit = 100
//! ```

mod config;
mod keys;
mod lock;
mod store;

pub use config::CacheConfig;
pub use keys::{ContentSection, RevalidateTarget, parse_path_target};
pub use store::ContentStore;
