//! The content-source seam.
//!
//! Handlers and services only know this trait; the GraphQL adapter in
//! `infra::cms` implements it, and tests substitute in-memory stubs.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{LinkItem, Post, PostSummary, Project, ProjectCard, Term};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("content source transport failure: {0}")]
    Transport(String),
    #[error("content source returned HTTP {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("content source rejected the query: {0}")]
    Upstream(String),
    #[error("failed to decode content source response: {0}")]
    Decode(String),
}

impl RepoError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }
}

/// Read-only view of the headless CMS.
#[async_trait]
pub trait ContentRepo: Send + Sync {
    async fn list_posts(&self, limit: u32) -> Result<Vec<PostSummary>, RepoError>;

    async fn post_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    async fn list_projects(&self, limit: u32) -> Result<Vec<ProjectCard>, RepoError>;

    async fn project_by_slug(&self, slug: &str) -> Result<Option<Project>, RepoError>;

    /// Flat taxonomy listing used to assemble the tech-stack tree.
    async fn all_tech_terms(&self) -> Result<Vec<Term>, RepoError>;

    async fn links(&self) -> Result<Vec<LinkItem>, RepoError>;
}
