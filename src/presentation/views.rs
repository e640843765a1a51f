use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

use crate::application::error::{ErrorReport, HttpError};
use crate::application::metadata::PageMeta;
use crate::config::SiteSettings;
use crate::domain::entities::{
    LinkItem, Post, PostSummary, Project, ProjectCard, RemoteImage,
};
use crate::domain::terms::TermNode;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response(chrome: LayoutChrome) -> Response {
    let content = ErrorPageView::not_found();
    let view = LayoutContext::new(chrome, content);
    let mut response = render_template_response(ErrorTemplate { view }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        "Resource not found",
    )
    .attach(&mut response);
    response
}

#[derive(Clone)]
pub struct BrandView {
    pub title: String,
    pub href: String,
}

#[derive(Clone)]
pub struct NavigationLinkView {
    pub label: String,
    pub href: String,
}

#[derive(Clone)]
pub struct NavigationView {
    pub entries: Vec<NavigationLinkView>,
}

#[derive(Clone)]
pub struct FooterView {
    pub copy: String,
}

#[derive(Clone)]
pub struct LayoutChrome {
    pub brand: BrandView,
    pub navigation: NavigationView,
    pub footer: FooterView,
    pub meta: PageMeta,
}

impl LayoutChrome {
    pub fn from_site(site: &SiteSettings, meta: PageMeta) -> Self {
        let entries = [
            ("Home", "/"),
            ("Blog", "/blog"),
            ("Projects", "/projects"),
            ("Links", "/links"),
        ]
        .into_iter()
        .map(|(label, href)| NavigationLinkView {
            label: label.to_string(),
            href: href.to_string(),
        })
        .collect();

        let year = OffsetDateTime::now_utc().year();

        Self {
            brand: BrandView {
                title: site.title.clone(),
                href: "/".to_string(),
            },
            navigation: NavigationView { entries },
            footer: FooterView {
                copy: format!("© {year} {}", site.title),
            },
            meta,
        }
    }

    pub fn with_meta(self, meta: PageMeta) -> Self {
        Self { meta, ..self }
    }
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub brand: BrandView,
    pub navigation: NavigationView,
    pub footer: FooterView,
    pub meta: PageMeta,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(chrome: LayoutChrome, content: T) -> Self {
        Self {
            brand: chrome.brand,
            navigation: chrome.navigation,
            footer: chrome.footer,
            meta: chrome.meta,
            content,
        }
    }
}

#[derive(Clone)]
pub struct ImageView {
    pub url: String,
    pub alt: String,
}

impl ImageView {
    fn from_remote(image: &RemoteImage) -> Self {
        Self {
            url: image.url.to_string(),
            alt: image.alt_text.clone().unwrap_or_default(),
        }
    }
}

#[derive(Clone)]
pub struct PostCardView {
    pub slug: String,
    pub title: String,
    pub iso_date: String,
    pub published: String,
}

impl PostCardView {
    pub fn from_summary(summary: &PostSummary) -> Self {
        let (iso_date, published) = format_dates(summary.published_at);
        Self {
            slug: summary.slug.clone(),
            title: summary.title.clone(),
            iso_date,
            published,
        }
    }
}

#[derive(Clone)]
pub struct ProjectCardView {
    pub slug: String,
    pub title: String,
    pub role: String,
    pub hero: Option<ImageView>,
    pub tech_names: Vec<String>,
    pub period: String,
}

impl ProjectCardView {
    pub fn from_card(card: &ProjectCard) -> Self {
        Self {
            slug: card.slug.clone(),
            title: card.title.clone(),
            role: card.role.clone(),
            hero: card.hero_image.as_ref().map(ImageView::from_remote),
            tech_names: card.tech_names.clone(),
            period: format_period(card.start_date.as_deref(), card.end_date.as_deref()),
        }
    }
}

pub struct HomeContext {
    pub recent_posts: Vec<PostCardView>,
    pub recent_projects: Vec<ProjectCardView>,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub view: LayoutContext<HomeContext>,
}

pub struct BlogContext {
    pub posts: Vec<PostCardView>,
}

#[derive(Template)]
#[template(path = "blog.html")]
pub struct BlogTemplate {
    pub view: LayoutContext<BlogContext>,
}

pub struct PostDetailContext {
    pub title: String,
    pub iso_date: String,
    pub published: String,
    pub content_html: String,
}

impl PostDetailContext {
    pub fn from_post(post: &Post) -> Self {
        let (iso_date, published) = format_dates(post.published_at);
        Self {
            title: post.title.clone(),
            iso_date,
            published,
            content_html: post.content_html.clone(),
        }
    }
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub view: LayoutContext<PostDetailContext>,
}

pub struct ProjectsContext {
    pub projects: Vec<ProjectCardView>,
}

#[derive(Template)]
#[template(path = "projects.html")]
pub struct ProjectsTemplate {
    pub view: LayoutContext<ProjectsContext>,
}

pub struct LinkView {
    pub label: String,
    pub href: String,
    pub description: String,
}

impl LinkView {
    pub fn from_item(item: &LinkItem) -> Self {
        Self {
            label: item.label.clone(),
            href: item.url.to_string(),
            description: item.description.clone().unwrap_or_default(),
        }
    }
}

pub struct ProjectDetailContext {
    pub title: String,
    pub role: String,
    pub period: String,
    pub content_html: String,
    pub hero: Option<ImageView>,
    pub links: Vec<LinkView>,
    pub tech_tree: Vec<TermTreeEvent>,
}

impl ProjectDetailContext {
    pub fn from_project(project: &Project, tech_tree: &[TermNode]) -> Self {
        Self {
            title: project.title.clone(),
            role: project.role.clone().unwrap_or_default(),
            period: format_period(project.start_date.as_deref(), project.end_date.as_deref()),
            content_html: project.content_html.clone(),
            hero: project.hero_image.as_ref().map(ImageView::from_remote),
            links: project
                .links
                .iter()
                .map(|link| LinkView {
                    label: link.label.clone(),
                    href: link.url.to_string(),
                    description: String::new(),
                })
                .collect(),
            tech_tree: term_tree_events(tech_tree),
        }
    }
}

#[derive(Template)]
#[template(path = "project.html")]
pub struct ProjectTemplate {
    pub view: LayoutContext<ProjectDetailContext>,
}

pub struct LinksContext {
    pub links: Vec<LinkView>,
}

#[derive(Template)]
#[template(path = "links.html")]
pub struct LinksTemplate {
    pub view: LayoutContext<LinksContext>,
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
    pub primary_action: Option<ErrorAction>,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Page Not Found".to_string(),
            message: "The page you requested does not exist. Try returning to the homepage to continue exploring.".to_string(),
            primary_action: Some(ErrorAction::home()),
        }
    }
}

pub struct ErrorAction {
    pub href: String,
    pub label: String,
}

impl ErrorAction {
    pub fn home() -> Self {
        Self {
            href: "/".to_string(),
            label: "Back to home".to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}

/// Flattened walk of the pruned term forest; templates replay the events to
/// emit nested lists without recursive includes.
#[derive(Clone, PartialEq, Debug)]
pub enum TermTreeEvent {
    StartNode { name: String, has_children: bool },
    StartChildren,
    EndChildren,
    EndNode,
}

pub fn term_tree_events(forest: &[TermNode]) -> Vec<TermTreeEvent> {
    let mut events = Vec::new();
    for node in forest {
        append_term_events(node, &mut events);
    }
    events
}

fn append_term_events(node: &TermNode, events: &mut Vec<TermTreeEvent>) {
    events.push(TermTreeEvent::StartNode {
        name: node.term.name.clone(),
        has_children: !node.children.is_empty(),
    });

    if !node.children.is_empty() {
        events.push(TermTreeEvent::StartChildren);
        for child in &node.children {
            append_term_events(child, events);
        }
        events.push(TermTreeEvent::EndChildren);
    }

    events.push(TermTreeEvent::EndNode);
}

fn format_dates(published_at: Option<OffsetDateTime>) -> (String, String) {
    let Some(dt) = published_at else {
        return (String::new(), String::new());
    };
    let iso = dt.format(&Rfc3339).unwrap_or_default();
    let display_format = format_description!("[month repr:long] [day padding:none], [year]");
    let display = dt.format(&display_format).unwrap_or_default();
    (iso, display)
}

fn format_period(start: Option<&str>, end: Option<&str>) -> String {
    match (start, end) {
        (Some(start), Some(end)) => format!("{start} – {end}"),
        (Some(start), None) => format!("{start} – present"),
        (None, Some(end)) => end.to_string(),
        (None, None) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Term;
    use crate::domain::terms::build_term_tree;

    fn term(db_id: i64, name: &str, parent: Option<i64>) -> Term {
        Term {
            id: format!("term:{db_id}"),
            db_id,
            name: name.to_string(),
            slug: name.to_lowercase(),
            parent_db_id: parent,
        }
    }

    #[test]
    fn term_tree_events_wrap_children() {
        let forest = build_term_tree(&[
            term(1, "Backend", None),
            term(2, "Go", Some(1)),
        ]);

        let events = term_tree_events(&forest);
        assert_eq!(
            events,
            vec![
                TermTreeEvent::StartNode {
                    name: "Backend".to_string(),
                    has_children: true
                },
                TermTreeEvent::StartChildren,
                TermTreeEvent::StartNode {
                    name: "Go".to_string(),
                    has_children: false
                },
                TermTreeEvent::EndNode,
                TermTreeEvent::EndChildren,
                TermTreeEvent::EndNode,
            ]
        );
    }

    #[test]
    fn empty_forest_yields_no_events() {
        assert!(term_tree_events(&[]).is_empty());
    }

    #[test]
    fn period_formatting_covers_open_ranges() {
        assert_eq!(format_period(Some("2023"), Some("2024")), "2023 – 2024");
        assert_eq!(format_period(Some("2023"), None), "2023 – present");
        assert_eq!(format_period(None, None), "");
    }
}
