//! Content assembly over the CMS repository.
//!
//! One service owns every public read path: listings, single entries, the
//! links page, and the per-project tech tree. Reads go through the content
//! store when one is configured; preview requests bypass it so editors see
//! draft changes immediately.

use std::sync::Arc;

use crate::application::repos::{ContentRepo, RepoError};
use crate::cache::ContentStore;
use crate::domain::entities::{LinkItem, Post, PostSummary, Project, ProjectCard};
use crate::domain::terms::{TermNode, make_tech_tree};

/// Whether a read may be served from the content store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Cached,
    /// Skip the store entirely (preview mode).
    Bypass,
}

#[derive(Debug, Clone, Copy)]
pub struct ContentLimits {
    /// Posts shown on the home page.
    pub recent_posts: usize,
    /// Project cards shown on the home page.
    pub recent_projects: usize,
    /// Upper bound for full listings (blog index, sitemap).
    pub listing: u32,
}

pub struct HomeContent {
    pub recent_posts: Vec<PostSummary>,
    pub recent_projects: Vec<ProjectCard>,
}

/// A project together with its pruned tech-stack forest.
pub struct ProjectDetail {
    pub project: Project,
    pub tech_tree: Vec<TermNode>,
}

#[derive(Clone)]
pub struct ContentService {
    repo: Arc<dyn ContentRepo>,
    cache: Option<Arc<ContentStore>>,
    limits: ContentLimits,
}

impl ContentService {
    pub fn new(
        repo: Arc<dyn ContentRepo>,
        cache: Option<Arc<ContentStore>>,
        limits: ContentLimits,
    ) -> Self {
        Self {
            repo,
            cache,
            limits,
        }
    }

    fn store(&self, freshness: Freshness) -> Option<&ContentStore> {
        match freshness {
            Freshness::Cached => self.cache.as_deref(),
            Freshness::Bypass => None,
        }
    }

    /// Full post listing, newest first. One fetch backs both the blog index
    /// and the home page, which slices off the first few entries.
    pub async fn list_posts(&self, freshness: Freshness) -> Result<Vec<PostSummary>, RepoError> {
        if let Some(store) = self.store(freshness) {
            if let Some(cached) = store.get_recent_posts() {
                return Ok(cached);
            }
        }

        let posts = self.repo.list_posts(self.limits.listing).await?;
        if let Some(store) = self.cache.as_deref() {
            store.set_recent_posts(posts.clone());
        }
        Ok(posts)
    }

    pub async fn list_projects(&self, freshness: Freshness) -> Result<Vec<ProjectCard>, RepoError> {
        if let Some(store) = self.store(freshness) {
            if let Some(cached) = store.get_recent_projects() {
                return Ok(cached);
            }
        }

        let projects = self.repo.list_projects(self.limits.listing).await?;
        if let Some(store) = self.cache.as_deref() {
            store.set_recent_projects(projects.clone());
        }
        Ok(projects)
    }

    pub async fn home(&self, freshness: Freshness) -> Result<HomeContent, RepoError> {
        let mut recent_posts = self.list_posts(freshness).await?;
        recent_posts.truncate(self.limits.recent_posts);

        let mut recent_projects = self.list_projects(freshness).await?;
        recent_projects.truncate(self.limits.recent_projects);

        Ok(HomeContent {
            recent_posts,
            recent_projects,
        })
    }

    pub async fn post(
        &self,
        slug: &str,
        freshness: Freshness,
    ) -> Result<Option<Post>, RepoError> {
        if let Some(store) = self.store(freshness) {
            if let Some(cached) = store.get_post(slug) {
                return Ok(Some(cached));
            }
        }

        let post = self.repo.post_by_slug(slug).await?;
        if let (Some(store), Some(post)) = (self.cache.as_deref(), post.as_ref()) {
            store.set_post(post.clone());
        }
        Ok(post)
    }

    /// Load a project and assemble its tech tree: the full taxonomy listing
    /// pruned down to the branches carrying this project's tagged terms.
    pub async fn project(
        &self,
        slug: &str,
        freshness: Freshness,
    ) -> Result<Option<ProjectDetail>, RepoError> {
        let project = self.project_record(slug, freshness).await?;
        let Some(project) = project else {
            return Ok(None);
        };

        let selected = project.selected_term_ids();
        let tech_tree = if selected.is_empty() {
            Vec::new()
        } else {
            let terms = self.tech_terms(freshness).await?;
            make_tech_tree(&terms, &selected)
        };

        Ok(Some(ProjectDetail { project, tech_tree }))
    }

    async fn project_record(
        &self,
        slug: &str,
        freshness: Freshness,
    ) -> Result<Option<Project>, RepoError> {
        if let Some(store) = self.store(freshness) {
            if let Some(cached) = store.get_project(slug) {
                return Ok(Some(cached));
            }
        }

        let project = self.repo.project_by_slug(slug).await?;
        if let (Some(store), Some(project)) = (self.cache.as_deref(), project.as_ref()) {
            store.set_project(project.clone());
        }
        Ok(project)
    }

    async fn tech_terms(
        &self,
        freshness: Freshness,
    ) -> Result<Vec<crate::domain::entities::Term>, RepoError> {
        if let Some(store) = self.store(freshness) {
            if let Some(cached) = store.get_terms() {
                return Ok(cached);
            }
        }

        let terms = self.repo.all_tech_terms().await?;
        if let Some(store) = self.cache.as_deref() {
            store.set_terms(terms.clone());
        }
        Ok(terms)
    }

    pub async fn links(&self, freshness: Freshness) -> Result<Vec<LinkItem>, RepoError> {
        if let Some(store) = self.store(freshness) {
            if let Some(cached) = store.get_links() {
                return Ok(cached);
            }
        }

        let links = self.repo.links().await?;
        if let Some(store) = self.cache.as_deref() {
            store.set_links(links.clone());
        }
        Ok(links)
    }
}
