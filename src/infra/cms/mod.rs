//! Headless-CMS adapter: GraphQL client, wire shapes and the `ContentRepo`
//! implementation handlers actually talk to.

mod client;
mod queries;
mod shapes;

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde_json::json;
use tracing::warn;
use url::Url;

use crate::application::repos::{ContentRepo, RepoError};
use crate::domain::entities::{LinkItem, Post, PostSummary, Project, ProjectCard, Term};

pub use client::GraphQlClient;

/// The taxonomy the tech stack lives in, WPGraphQL enum spelling.
const TECH_TAXONOMY: &str = "CATEGORY";

/// Shown when the CMS cannot produce the links page; a static fallback beats
/// a 502 on a page this small.
static FALLBACK_LINKS: Lazy<Vec<LinkItem>> = Lazy::new(|| {
    [
        ("Website", "https://michaelborntreger.life"),
        ("LinkedIn", "https://www.linkedin.com"),
        ("GitHub", "https://github.com"),
    ]
    .into_iter()
    .filter_map(|(label, url)| {
        Some(LinkItem {
            label: label.to_string(),
            url: Url::parse(url).ok()?,
            description: None,
        })
    })
    .collect()
});

pub struct CmsContentRepo {
    client: GraphQlClient,
    term_page_size: u32,
}

impl CmsContentRepo {
    pub fn new(endpoint: Url, timeout: Duration, term_page_size: u32) -> Result<Self, RepoError> {
        Ok(Self {
            client: GraphQlClient::new(endpoint, timeout)?,
            term_page_size,
        })
    }
}

#[async_trait]
impl ContentRepo for CmsContentRepo {
    async fn list_posts(&self, limit: u32) -> Result<Vec<PostSummary>, RepoError> {
        let data: shapes::PostsData = self
            .client
            .request("list_posts", queries::LIST_POSTS, json!({ "limit": limit }))
            .await?;
        Ok(shapes::map_post_summaries(data))
    }

    async fn post_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let data: shapes::PostData = self
            .client
            .request("post_by_slug", queries::POST_BY_SLUG, json!({ "slug": slug }))
            .await?;
        Ok(data.post.and_then(shapes::map_post))
    }

    async fn list_projects(&self, limit: u32) -> Result<Vec<ProjectCard>, RepoError> {
        let data: shapes::ProjectsData = self
            .client
            .request(
                "list_projects",
                queries::LIST_PROJECTS,
                json!({ "limit": limit }),
            )
            .await?;
        Ok(shapes::map_project_cards(data))
    }

    async fn project_by_slug(&self, slug: &str) -> Result<Option<Project>, RepoError> {
        let data: shapes::ProjectData = self
            .client
            .request(
                "project_by_slug",
                queries::PROJECT_BY_SLUG,
                json!({ "slug": slug }),
            )
            .await?;
        Ok(data.project.and_then(shapes::map_project))
    }

    async fn all_tech_terms(&self) -> Result<Vec<Term>, RepoError> {
        let data: shapes::TermsData = self
            .client
            .request(
                "all_tech_terms",
                queries::ALL_TECH_TERMS,
                json!({ "tax": [TECH_TAXONOMY], "limit": self.term_page_size }),
            )
            .await?;
        Ok(shapes::map_terms(data))
    }

    async fn links(&self) -> Result<Vec<LinkItem>, RepoError> {
        let result: Result<shapes::LinksData, RepoError> = self
            .client
            .request("links", queries::LINKS_PAGE, json!({}))
            .await;

        match result {
            Ok(data) => Ok(shapes::map_links(data)),
            Err(err) => {
                warn!(
                    target = "vetrina::cms",
                    error = %err,
                    "links page unavailable, serving fallback list"
                );
                Ok(FALLBACK_LINKS.clone())
            }
        }
    }
}
