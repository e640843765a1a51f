//! Content cache storage.
//!
//! One typed store: singleton slots for site-wide collections and LRU maps
//! keyed by slug for individual entries. Every slot carries the instant it was
//! filled; a read only hits when the entry is younger than the configured TTL,
//! which is what makes revalidation incremental — stale entries are simply
//! refetched on the next read.

use std::sync::RwLock;
use std::time::{Duration, Instant};

use lru::LruCache;
use metrics::counter;

use crate::domain::entities::{LinkItem, Post, PostSummary, Project, ProjectCard, Term};

use super::config::CacheConfig;
use super::keys::{ContentSection, RevalidateTarget};
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

#[derive(Clone)]
struct Timed<T> {
    value: T,
    stored_at: Instant,
}

impl<T> Timed<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            stored_at: Instant::now(),
        }
    }

    fn is_fresh(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() < ttl
    }
}

/// In-memory content store shared across request handlers.
pub struct ContentStore {
    ttl: Duration,

    // Singletons (site-wide collections, no eviction needed)
    terms: RwLock<Option<Timed<Vec<Term>>>>,
    links: RwLock<Option<Timed<Vec<LinkItem>>>>,
    recent_posts: RwLock<Option<Timed<Vec<PostSummary>>>>,
    recent_projects: RwLock<Option<Timed<Vec<ProjectCard>>>>,

    // KV caches (slug-keyed, LRU eviction)
    posts_by_slug: RwLock<LruCache<String, Timed<Post>>>,
    projects_by_slug: RwLock<LruCache<String, Timed<Project>>>,
}

impl ContentStore {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            ttl: config.ttl(),
            terms: RwLock::new(None),
            links: RwLock::new(None),
            recent_posts: RwLock::new(None),
            recent_projects: RwLock::new(None),
            posts_by_slug: RwLock::new(LruCache::new(config.post_limit_non_zero())),
            projects_by_slug: RwLock::new(LruCache::new(config.project_limit_non_zero())),
        }
    }

    // ========================================================================
    // Singletons
    // ========================================================================

    pub fn get_terms(&self) -> Option<Vec<Term>> {
        let hit = rw_read(&self.terms, SOURCE, "get_terms")
            .as_ref()
            .filter(|entry| entry.is_fresh(self.ttl))
            .map(|entry| entry.value.clone());
        record_lookup("terms", hit.is_some());
        hit
    }

    pub fn set_terms(&self, value: Vec<Term>) {
        *rw_write(&self.terms, SOURCE, "set_terms") = Some(Timed::new(value));
    }

    pub fn invalidate_terms(&self) {
        *rw_write(&self.terms, SOURCE, "invalidate_terms") = None;
    }

    pub fn get_links(&self) -> Option<Vec<LinkItem>> {
        let hit = rw_read(&self.links, SOURCE, "get_links")
            .as_ref()
            .filter(|entry| entry.is_fresh(self.ttl))
            .map(|entry| entry.value.clone());
        record_lookup("links", hit.is_some());
        hit
    }

    pub fn set_links(&self, value: Vec<LinkItem>) {
        *rw_write(&self.links, SOURCE, "set_links") = Some(Timed::new(value));
    }

    pub fn invalidate_links(&self) {
        *rw_write(&self.links, SOURCE, "invalidate_links") = None;
    }

    pub fn get_recent_posts(&self) -> Option<Vec<PostSummary>> {
        let hit = rw_read(&self.recent_posts, SOURCE, "get_recent_posts")
            .as_ref()
            .filter(|entry| entry.is_fresh(self.ttl))
            .map(|entry| entry.value.clone());
        record_lookup("recent_posts", hit.is_some());
        hit
    }

    pub fn set_recent_posts(&self, value: Vec<PostSummary>) {
        *rw_write(&self.recent_posts, SOURCE, "set_recent_posts") = Some(Timed::new(value));
    }

    pub fn invalidate_recent_posts(&self) {
        *rw_write(&self.recent_posts, SOURCE, "invalidate_recent_posts") = None;
    }

    pub fn get_recent_projects(&self) -> Option<Vec<ProjectCard>> {
        let hit = rw_read(&self.recent_projects, SOURCE, "get_recent_projects")
            .as_ref()
            .filter(|entry| entry.is_fresh(self.ttl))
            .map(|entry| entry.value.clone());
        record_lookup("recent_projects", hit.is_some());
        hit
    }

    pub fn set_recent_projects(&self, value: Vec<ProjectCard>) {
        *rw_write(&self.recent_projects, SOURCE, "set_recent_projects") = Some(Timed::new(value));
    }

    pub fn invalidate_recent_projects(&self) {
        *rw_write(&self.recent_projects, SOURCE, "invalidate_recent_projects") = None;
    }

    // ========================================================================
    // Slug-keyed entries
    // ========================================================================

    pub fn get_post(&self, slug: &str) -> Option<Post> {
        let hit = rw_write(&self.posts_by_slug, SOURCE, "get_post")
            .get(slug)
            .filter(|entry| entry.is_fresh(self.ttl))
            .map(|entry| entry.value.clone());
        record_lookup("post", hit.is_some());
        hit
    }

    pub fn set_post(&self, post: Post) {
        let slug = post.slug.clone();
        let evicted = rw_write(&self.posts_by_slug, SOURCE, "set_post")
            .push(slug.clone(), Timed::new(post));
        // push also returns the old entry on a same-key update; only a
        // different key means capacity eviction.
        if evicted.is_some_and(|(key, _)| key != slug) {
            counter!("vetrina_cache_evict_total", "slot" => "post").increment(1);
        }
    }

    pub fn invalidate_post(&self, slug: &str) {
        rw_write(&self.posts_by_slug, SOURCE, "invalidate_post").pop(slug);
        self.invalidate_recent_posts();
    }

    pub fn get_project(&self, slug: &str) -> Option<Project> {
        let hit = rw_write(&self.projects_by_slug, SOURCE, "get_project")
            .get(slug)
            .filter(|entry| entry.is_fresh(self.ttl))
            .map(|entry| entry.value.clone());
        record_lookup("project", hit.is_some());
        hit
    }

    pub fn set_project(&self, project: Project) {
        let slug = project.slug.clone();
        let evicted = rw_write(&self.projects_by_slug, SOURCE, "set_project")
            .push(slug.clone(), Timed::new(project));
        if evicted.is_some_and(|(key, _)| key != slug) {
            counter!("vetrina_cache_evict_total", "slot" => "project").increment(1);
        }
    }

    pub fn invalidate_project(&self, slug: &str) {
        rw_write(&self.projects_by_slug, SOURCE, "invalidate_project").pop(slug);
        self.invalidate_recent_projects();
    }

    // ========================================================================
    // Bulk operations
    // ========================================================================

    pub fn invalidate_section(&self, section: ContentSection) {
        match section {
            ContentSection::Posts => {
                rw_write(&self.posts_by_slug, SOURCE, "invalidate_section.posts").clear();
                self.invalidate_recent_posts();
            }
            ContentSection::Projects => {
                rw_write(&self.projects_by_slug, SOURCE, "invalidate_section.projects").clear();
                self.invalidate_recent_projects();
            }
            ContentSection::Terms => self.invalidate_terms(),
            ContentSection::Links => self.invalidate_links(),
            ContentSection::All => self.clear(),
        }
    }

    pub fn apply(&self, target: &RevalidateTarget) {
        match target {
            RevalidateTarget::PostSlug(slug) => self.invalidate_post(slug),
            RevalidateTarget::ProjectSlug(slug) => self.invalidate_project(slug),
            RevalidateTarget::Section(section) => self.invalidate_section(*section),
        }
    }

    /// Drop all cached content.
    pub fn clear(&self) {
        self.invalidate_terms();
        self.invalidate_links();
        self.invalidate_recent_posts();
        self.invalidate_recent_projects();
        rw_write(&self.posts_by_slug, SOURCE, "clear.posts_by_slug").clear();
        rw_write(&self.projects_by_slug, SOURCE, "clear.projects_by_slug").clear();
    }
}

fn record_lookup(slot: &'static str, hit: bool) {
    if hit {
        counter!("vetrina_cache_hit_total", "slot" => slot).increment(1);
    } else {
        counter!("vetrina_cache_miss_total", "slot" => slot).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use super::*;

    fn sample_post(slug: &str) -> Post {
        Post {
            slug: slug.to_string(),
            title: "Test Post".to_string(),
            content_html: "<p>Body</p>".to_string(),
            published_at: None,
            seo: None,
        }
    }

    fn sample_terms() -> Vec<Term> {
        vec![Term {
            id: "term:1".to_string(),
            db_id: 1,
            name: "Backend".to_string(),
            slug: "backend".to_string(),
            parent_db_id: None,
        }]
    }

    fn store_with(ttl_seconds: u64, post_limit: usize) -> ContentStore {
        ContentStore::new(&CacheConfig {
            enabled: true,
            ttl_seconds,
            post_limit,
            project_limit: 10,
        })
    }

    #[test]
    fn post_cache_roundtrip() {
        let store = store_with(300, 10);

        assert!(store.get_post("test-post").is_none());
        store.set_post(sample_post("test-post"));

        let cached = store.get_post("test-post").expect("cached post");
        assert_eq!(cached.title, "Test Post");

        store.invalidate_post("test-post");
        assert!(store.get_post("test-post").is_none());
    }

    #[test]
    fn zero_ttl_entries_are_always_stale() {
        let store = store_with(0, 10);

        store.set_post(sample_post("test-post"));
        store.set_terms(sample_terms());

        assert!(store.get_post("test-post").is_none());
        assert!(store.get_terms().is_none());
    }

    #[test]
    fn singleton_cache_roundtrip() {
        let store = store_with(300, 10);

        assert!(store.get_terms().is_none());
        store.set_terms(sample_terms());
        assert_eq!(store.get_terms().expect("cached terms").len(), 1);

        store.invalidate_terms();
        assert!(store.get_terms().is_none());
    }

    #[test]
    fn lru_eviction_drops_oldest_post() {
        let store = store_with(300, 2);

        store.set_post(sample_post("post-1"));
        store.set_post(sample_post("post-2"));
        assert!(store.get_post("post-1").is_some());
        assert!(store.get_post("post-2").is_some());

        store.set_post(sample_post("post-3"));

        assert!(store.get_post("post-1").is_none());
        assert!(store.get_post("post-2").is_some());
        assert!(store.get_post("post-3").is_some());
    }

    #[test]
    fn section_invalidation_clears_related_slots() {
        let store = store_with(300, 10);

        store.set_post(sample_post("a"));
        store.set_recent_posts(vec![PostSummary {
            slug: "a".to_string(),
            title: "A".to_string(),
            published_at: None,
        }]);

        store.invalidate_section(ContentSection::Posts);
        assert!(store.get_post("a").is_none());
        assert!(store.get_recent_posts().is_none());
    }

    #[test]
    fn apply_resolves_targets() {
        let store = store_with(300, 10);

        store.set_post(sample_post("a"));
        store.apply(&RevalidateTarget::PostSlug("a".to_string()));
        assert!(store.get_post("a").is_none());

        store.set_terms(sample_terms());
        store.apply(&RevalidateTarget::Section(ContentSection::All));
        assert!(store.get_terms().is_none());
    }

    #[test]
    fn store_recovers_from_poisoned_lock() {
        let store = store_with(300, 10);

        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = store.terms.write().expect("terms lock should be acquired");
            panic!("poison terms lock");
        }));

        store.set_terms(sample_terms());
        assert!(store.get_terms().is_some());
    }
}
