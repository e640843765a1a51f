//! Neutral content records mapped from the CMS schema at the boundary.

use serde::Serialize;
use time::OffsetDateTime;
use url::Url;

/// A single taxonomy entry as delivered by the CMS.
///
/// `db_id` is the stable numeric identifier used for parent linkage and
/// selection membership; `id` is the backend's opaque global identifier and
/// `slug` is carried through untouched for display layers that want it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Term {
    pub id: String,
    pub db_id: i64,
    pub name: String,
    pub slug: String,
    pub parent_db_id: Option<i64>,
}

/// A term selected on a specific project (its tagged tech stack).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedTerm {
    pub db_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemoteImage {
    pub url: Url,
    pub alt_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostSummary {
    pub slug: String,
    pub title: String,
    pub published_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub slug: String,
    pub title: String,
    pub content_html: String,
    pub published_at: Option<OffsetDateTime>,
    pub seo: Option<SeoOverrides>,
}

/// Card data for project listings; `tech_names` holds top-level term names
/// only, for chip rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectCard {
    pub slug: String,
    pub title: String,
    pub role: String,
    pub hero_image: Option<RemoteImage>,
    pub tech_names: Vec<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Project {
    pub slug: String,
    pub title: String,
    pub content_html: String,
    pub published_at: Option<OffsetDateTime>,
    pub role: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub hero_image: Option<RemoteImage>,
    pub tech_terms: Vec<SelectedTerm>,
    pub links: Vec<ProjectLink>,
    pub seo: Option<SeoOverrides>,
}

impl Project {
    /// Identifiers of the terms tagged on this project, for tree pruning.
    pub fn selected_term_ids(&self) -> std::collections::HashSet<i64> {
        self.tech_terms.iter().map(|term| term.db_id).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectLink {
    pub label: String,
    pub url: Url,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkItem {
    pub label: String,
    pub url: Url,
    pub description: Option<String>,
}

/// Per-entry SEO overrides supplied by the CMS; absent fields fall back to
/// site-level defaults when metadata is assembled.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeoOverrides {
    pub title: Option<String>,
    pub description: Option<String>,
    pub canonical_url: Option<String>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<RemoteImage>,
    pub published_time: Option<String>,
    pub modified_time: Option<String>,
}
