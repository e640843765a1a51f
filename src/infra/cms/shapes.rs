//! Wire shapes for CMS responses and their mapping into domain records.
//!
//! Everything the CMS sends is treated as untrusted and partial: every field
//! is optional at the boundary, records missing their identifying fields are
//! skipped rather than failing the whole response, and HTML bodies are
//! sanitized before they reach a template.

use ammonia::Builder;
use once_cell::sync::Lazy;
use serde::Deserialize;
use time::format_description::well_known::{Iso8601, Rfc3339};
use time::{OffsetDateTime, PrimitiveDateTime};
use url::Url;

use crate::domain::entities::{
    LinkItem, Post, PostSummary, Project, ProjectCard, ProjectLink, RemoteImage, SelectedTerm,
    SeoOverrides, Term,
};

static SANITIZER: Lazy<Builder<'static>> = Lazy::new(Builder::default);

pub(crate) fn sanitize_html(html: &str) -> String {
    SANITIZER.clean(html).to_string()
}

/// CMS dates arrive either with an offset or as bare local timestamps; bare
/// ones are read as UTC. Unparseable values become `None` instead of failing
/// the record.
pub(crate) fn parse_cms_date(value: &str) -> Option<OffsetDateTime> {
    if let Ok(parsed) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(parsed);
    }
    PrimitiveDateTime::parse(value, &Iso8601::DEFAULT)
        .map(PrimitiveDateTime::assume_utc)
        .ok()
}

fn parse_image(url: Option<String>, alt_text: Option<String>) -> Option<RemoteImage> {
    let url = Url::parse(url?.as_str()).ok()?;
    Some(RemoteImage { url, alt_text })
}

// ============================================================================
// Wire shapes
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct NodeList<T> {
    pub nodes: Option<Vec<Option<T>>>,
}

impl<T> NodeList<T> {
    fn into_nodes(self) -> Vec<T> {
        self.nodes.unwrap_or_default().into_iter().flatten().collect()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostsData {
    pub posts: Option<NodeList<PostNode>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostData {
    pub post: Option<PostNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostNode {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub date: Option<String>,
    pub content: Option<String>,
    pub seo: Option<SeoNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SeoNode {
    pub title: Option<String>,
    pub description: Option<String>,
    pub canonical_url: Option<String>,
    pub open_graph: Option<OpenGraphNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OpenGraphNode {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<OpenGraphImageNode>,
    pub article_meta: Option<ArticleMetaNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OpenGraphImageNode {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ArticleMetaNode {
    pub published_time: Option<String>,
    pub modified_time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectsData {
    pub projects: Option<NodeList<ProjectNode>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectData {
    pub project: Option<ProjectNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProjectNode {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub date: Option<String>,
    pub seo: Option<SeoNode>,
    pub project_fields: Option<ProjectFieldsNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProjectFieldsNode {
    pub role: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub tech_stack: Option<NodeList<TechTermNode>>,
    pub hero_image: Option<HeroImageNode>,
    pub links: Option<Vec<Option<ProjectLinkNode>>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TechTermNode {
    pub id: Option<String>,
    pub database_id: Option<i64>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub parent_database_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HeroImageNode {
    pub node: Option<ImageNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ImageNode {
    pub source_url: Option<String>,
    pub alt_text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectLinkNode {
    pub label: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TermsData {
    pub terms: Option<NodeList<TechTermNode>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LinksData {
    pub page: Option<LinksPageNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LinksPageNode {
    pub links_fields: Option<LinksFieldsNode>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LinksFieldsNode {
    pub items: Option<Vec<Option<LinkEntryNode>>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LinkEntryNode {
    pub label: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
}

// ============================================================================
// Mapping
// ============================================================================

pub(crate) fn map_post_summaries(data: PostsData) -> Vec<PostSummary> {
    data.posts
        .map(NodeList::into_nodes)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|node| {
            let slug = node.slug?;
            let title = node.title?;
            Some(PostSummary {
                slug,
                title,
                published_at: node.date.as_deref().and_then(parse_cms_date),
            })
        })
        .collect()
}

pub(crate) fn map_post(node: PostNode) -> Option<Post> {
    let slug = node.slug?;
    let title = node.title?;
    Some(Post {
        slug,
        title,
        content_html: sanitize_html(node.content.as_deref().unwrap_or_default()),
        published_at: node.date.as_deref().and_then(parse_cms_date),
        seo: node.seo.map(map_seo),
    })
}

fn map_seo(node: SeoNode) -> SeoOverrides {
    let og = node.open_graph;
    let (og_title, og_description, og_image, published_time, modified_time) = match og {
        Some(og) => (
            og.title,
            og.description,
            og.image.and_then(|image| parse_image(image.url, None)),
            og.article_meta
                .as_ref()
                .and_then(|meta| meta.published_time.clone()),
            og.article_meta.and_then(|meta| meta.modified_time),
        ),
        None => (None, None, None, None, None),
    };

    SeoOverrides {
        title: node.title,
        description: node.description,
        canonical_url: node.canonical_url,
        og_title,
        og_description,
        og_image,
        published_time,
        modified_time,
    }
}

pub(crate) fn map_project_cards(data: ProjectsData) -> Vec<ProjectCard> {
    data.projects
        .map(NodeList::into_nodes)
        .unwrap_or_default()
        .into_iter()
        .filter_map(map_project_card)
        .collect()
}

fn map_project_card(node: ProjectNode) -> Option<ProjectCard> {
    let slug = node.slug?;
    let title = node.title?;
    let fields = node.project_fields;

    // Cards show only top-level categories: terms without a parent.
    let tech_names = fields
        .as_ref()
        .and_then(|f| f.tech_stack.as_ref())
        .and_then(|stack| stack.nodes.as_ref())
        .map(|nodes| {
            nodes
                .iter()
                .flatten()
                .filter(|term| term.parent_database_id.is_none())
                .filter_map(|term| term.name.clone())
                .collect()
        })
        .unwrap_or_default();

    let hero_image = fields
        .as_ref()
        .and_then(|f| f.hero_image.as_ref())
        .and_then(|hero| hero.node.as_ref())
        .and_then(|image| parse_image(image.source_url.clone(), image.alt_text.clone()));

    Some(ProjectCard {
        slug,
        title,
        role: fields
            .as_ref()
            .and_then(|f| f.role.clone())
            .unwrap_or_default(),
        hero_image,
        tech_names,
        start_date: fields.as_ref().and_then(|f| f.start_date.clone()),
        end_date: fields.and_then(|f| f.end_date),
    })
}

pub(crate) fn map_project(node: ProjectNode) -> Option<Project> {
    let slug = node.slug?;
    let title = node.title?;
    let fields = node.project_fields;

    let tech_terms = fields
        .as_ref()
        .and_then(|f| f.tech_stack.as_ref())
        .and_then(|stack| stack.nodes.as_ref())
        .map(|nodes| {
            nodes
                .iter()
                .flatten()
                .filter_map(|term| {
                    Some(SelectedTerm {
                        db_id: term.database_id?,
                        name: term.name.clone()?,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let hero_image = fields
        .as_ref()
        .and_then(|f| f.hero_image.as_ref())
        .and_then(|hero| hero.node.as_ref())
        .and_then(|image| parse_image(image.source_url.clone(), image.alt_text.clone()));

    let links = fields
        .as_ref()
        .and_then(|f| f.links.as_ref())
        .map(|links| {
            links
                .iter()
                .flatten()
                .filter_map(|link| {
                    let label = link.label.clone()?;
                    let url = Url::parse(link.url.as_deref()?).ok()?;
                    Some(ProjectLink { label, url })
                })
                .collect()
        })
        .unwrap_or_default();

    Some(Project {
        slug,
        title,
        content_html: sanitize_html(node.content.as_deref().unwrap_or_default()),
        published_at: node.date.as_deref().and_then(parse_cms_date),
        role: fields.as_ref().and_then(|f| f.role.clone()),
        start_date: fields.as_ref().and_then(|f| f.start_date.clone()),
        end_date: fields.and_then(|f| f.end_date),
        hero_image,
        tech_terms,
        links,
        seo: node.seo.map(map_seo),
    })
}

pub(crate) fn map_terms(data: TermsData) -> Vec<Term> {
    data.terms
        .map(NodeList::into_nodes)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|node| {
            Some(Term {
                id: node.id?,
                db_id: node.database_id?,
                name: node.name?,
                slug: node.slug.unwrap_or_default(),
                parent_db_id: node.parent_database_id,
            })
        })
        .collect()
}

pub(crate) fn map_links(data: LinksData) -> Vec<LinkItem> {
    data.page
        .and_then(|page| page.links_fields)
        .and_then(|fields| fields.items)
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .filter_map(|item| {
            let label = item.label?;
            let url = Url::parse(item.url.as_deref()?).ok()?;
            Some(LinkItem {
                label,
                url,
                description: item.description,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn post_listing_skips_records_missing_identifiers() {
        let data: PostsData = serde_json::from_value(json!({
            "posts": { "nodes": [
                { "slug": "hello", "title": "Hello", "date": "2025-06-01T12:00:00" },
                { "title": "No slug" },
                null
            ] }
        }))
        .expect("decode");

        let summaries = map_post_summaries(data);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].slug, "hello");
        assert!(summaries[0].published_at.is_some());
    }

    #[test]
    fn bare_cms_dates_are_read_as_utc() {
        let parsed = parse_cms_date("2025-06-01T12:30:00").expect("parse");
        assert_eq!(parsed.offset(), time::UtcOffset::UTC);
        assert_eq!(parsed.hour(), 12);

        assert!(parse_cms_date("yesterday").is_none());
    }

    #[test]
    fn post_content_is_sanitized() {
        let node: PostNode = serde_json::from_value(json!({
            "slug": "xss",
            "title": "XSS",
            "content": "<p>ok</p><script>alert(1)</script>"
        }))
        .expect("decode");

        let post = map_post(node).expect("post");
        assert!(post.content_html.contains("<p>ok</p>"));
        assert!(!post.content_html.contains("script"));
    }

    #[test]
    fn project_card_keeps_top_level_tech_names_only() {
        let data: ProjectsData = serde_json::from_value(json!({
            "projects": { "nodes": [ {
                "slug": "vetrina",
                "title": "Vetrina",
                "projectFields": {
                    "role": "Author",
                    "techStack": { "nodes": [
                        { "id": "dGVybTox", "databaseId": 1, "name": "Backend" },
                        { "id": "dGVybToy", "databaseId": 2, "name": "Go", "parentDatabaseId": 1 }
                    ] },
                    "heroImage": { "node": { "sourceUrl": "https://cdn.example.com/hero.png", "altText": "Hero" } }
                }
            } ] }
        }))
        .expect("decode");

        let cards = map_project_cards(data);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].tech_names, ["Backend"]);
        assert_eq!(
            cards[0].hero_image.as_ref().expect("hero").url.as_str(),
            "https://cdn.example.com/hero.png"
        );
    }

    #[test]
    fn project_detail_collects_selected_terms_and_links() {
        let node: ProjectNode = serde_json::from_value(json!({
            "slug": "vetrina",
            "title": "Vetrina",
            "content": "<p>About</p>",
            "projectFields": {
                "techStack": { "nodes": [
                    { "id": "dGVybToy", "databaseId": 2, "name": "Go", "parentDatabaseId": 1 },
                    { "name": "No id" }
                ] },
                "links": [
                    { "label": "Source", "url": "https://example.com/src" },
                    { "label": "Broken", "url": "not a url" },
                    null
                ]
            }
        }))
        .expect("decode");

        let project = map_project(node).expect("project");
        assert_eq!(project.tech_terms.len(), 1);
        assert_eq!(project.tech_terms[0].db_id, 2);
        assert_eq!(project.links.len(), 1);
        assert_eq!(project.links[0].label, "Source");
    }

    #[test]
    fn term_listing_maps_parent_ids_and_skips_malformed_rows() {
        let data: TermsData = serde_json::from_value(json!({
            "terms": { "nodes": [
                { "id": "dGVybTox", "databaseId": 1, "name": "Backend", "slug": "backend" },
                { "id": "dGVybToy", "databaseId": 2, "name": "Go", "slug": "go", "parentDatabaseId": 1 },
                { "id": "dGVybToz", "name": "No database id" }
            ] }
        }))
        .expect("decode");

        let terms = map_terms(data);
        assert_eq!(terms.len(), 2);
        assert_eq!(terms[1].parent_db_id, Some(1));
    }

    #[test]
    fn seo_overrides_carry_open_graph_fields() {
        let node: PostNode = serde_json::from_value(json!({
            "slug": "hello",
            "title": "Hello",
            "seo": {
                "title": "Override",
                "canonicalUrl": "https://example.life/blog/hello",
                "openGraph": {
                    "description": "OG description",
                    "image": { "url": "https://cdn.example.com/og.png" },
                    "articleMeta": { "publishedTime": "2025-06-01T12:00:00" }
                }
            }
        }))
        .expect("decode");

        let seo = map_post(node).expect("post").seo.expect("seo");
        assert_eq!(seo.title.as_deref(), Some("Override"));
        assert_eq!(seo.og_description.as_deref(), Some("OG description"));
        assert!(seo.og_image.is_some());
        assert_eq!(seo.published_time.as_deref(), Some("2025-06-01T12:00:00"));
    }

    #[test]
    fn links_page_filters_incomplete_entries() {
        let data: LinksData = serde_json::from_value(json!({
            "page": { "linksFields": { "items": [
                { "label": "GitHub", "url": "https://github.com", "description": "Code" },
                { "label": "No url" },
                null
            ] } }
        }))
        .expect("decode");

        let links = map_links(data);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].label, "GitHub");
    }
}
