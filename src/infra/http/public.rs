use axum::{
    Router,
    body::Body,
    extract::{Path, State},
    http::{
        HeaderMap, StatusCode,
        header::{CONTENT_TYPE, COOKIE},
    },
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::{
    application::{
        content::Freshness,
        error::HttpError,
        metadata::PageMeta,
    },
    presentation::views::{
        BlogContext, BlogTemplate, HomeContext, IndexTemplate, LayoutChrome, LayoutContext,
        LinkView, LinksContext, LinksTemplate, PostCardView, PostDetailContext, PostTemplate,
        ProjectCardView, ProjectDetailContext, ProjectTemplate, ProjectsContext, ProjectsTemplate,
        render_not_found_response, render_template_response,
    },
};

use super::{
    HttpState, hooks,
    middleware::{log_responses, set_request_context},
};

pub const PREVIEW_COOKIE: &str = "preview";

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/blog", get(blog_index))
        .route("/blog/{slug}", get(post_detail))
        .route("/projects", get(projects_index))
        .route("/projects/{slug}", get(project_detail))
        .route("/links", get(links_page))
        .route("/sitemap.xml", get(sitemap))
        .route("/robots.txt", get(robots_txt))
        .route("/_health", get(health))
        .route("/api/revalidate", post(hooks::revalidate))
        .route("/api/preview", get(hooks::preview))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

/// Editors carrying the preview cookie bypass the content store so draft
/// changes show up immediately.
fn request_freshness(headers: &HeaderMap) -> Freshness {
    let has_preview = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .any(|pair| {
            let mut parts = pair.trim().splitn(2, '=');
            parts.next() == Some(PREVIEW_COOKIE) && parts.next() == Some("1")
        });

    if has_preview {
        Freshness::Bypass
    } else {
        Freshness::Cached
    }
}

async fn index(State(state): State<HttpState>, headers: HeaderMap) -> Response {
    let freshness = request_freshness(&headers);

    match state.content.home(freshness).await {
        Ok(home) => {
            let chrome = LayoutChrome::from_site(&state.site, PageMeta::for_home(&state.site));
            let content = HomeContext {
                recent_posts: home.recent_posts.iter().map(PostCardView::from_summary).collect(),
                recent_projects: home
                    .recent_projects
                    .iter()
                    .map(ProjectCardView::from_card)
                    .collect(),
            };
            render_template_response(
                IndexTemplate {
                    view: LayoutContext::new(chrome, content),
                },
                StatusCode::OK,
            )
        }
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn blog_index(State(state): State<HttpState>, headers: HeaderMap) -> Response {
    let freshness = request_freshness(&headers);

    match state.content.list_posts(freshness).await {
        Ok(posts) => {
            let meta = PageMeta::site_default(&state.site, "/blog");
            let chrome = LayoutChrome::from_site(&state.site, meta);
            let content = BlogContext {
                posts: posts.iter().map(PostCardView::from_summary).collect(),
            };
            render_template_response(
                BlogTemplate {
                    view: LayoutContext::new(chrome, content),
                },
                StatusCode::OK,
            )
        }
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn post_detail(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Response {
    let freshness = request_freshness(&headers);

    match state.content.post(&slug, freshness).await {
        Ok(Some(post)) => {
            let meta = PageMeta::for_post(&state.site, &post);
            let chrome = LayoutChrome::from_site(&state.site, meta);
            let content = PostDetailContext::from_post(&post);
            render_template_response(
                PostTemplate {
                    view: LayoutContext::new(chrome, content),
                },
                StatusCode::OK,
            )
        }
        Ok(None) => not_found(&state, &format!("/blog/{slug}")),
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn projects_index(State(state): State<HttpState>, headers: HeaderMap) -> Response {
    let freshness = request_freshness(&headers);

    match state.content.list_projects(freshness).await {
        Ok(projects) => {
            let meta = PageMeta::site_default(&state.site, "/projects");
            let chrome = LayoutChrome::from_site(&state.site, meta);
            let content = ProjectsContext {
                projects: projects.iter().map(ProjectCardView::from_card).collect(),
            };
            render_template_response(
                ProjectsTemplate {
                    view: LayoutContext::new(chrome, content),
                },
                StatusCode::OK,
            )
        }
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn project_detail(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Response {
    let freshness = request_freshness(&headers);

    match state.content.project(&slug, freshness).await {
        Ok(Some(detail)) => {
            let meta = PageMeta::for_project(&state.site, &detail.project);
            let chrome = LayoutChrome::from_site(&state.site, meta);
            let content = ProjectDetailContext::from_project(&detail.project, &detail.tech_tree);
            render_template_response(
                ProjectTemplate {
                    view: LayoutContext::new(chrome, content),
                },
                StatusCode::OK,
            )
        }
        Ok(None) => not_found(&state, &format!("/projects/{slug}")),
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn links_page(State(state): State<HttpState>, headers: HeaderMap) -> Response {
    let freshness = request_freshness(&headers);

    match state.content.links(freshness).await {
        Ok(links) => {
            let meta = PageMeta::site_default(&state.site, "/links");
            let chrome = LayoutChrome::from_site(&state.site, meta);
            let content = LinksContext {
                links: links.iter().map(LinkView::from_item).collect(),
            };
            render_template_response(
                LinksTemplate {
                    view: LayoutContext::new(chrome, content),
                },
                StatusCode::OK,
            )
        }
        Err(err) => HttpError::from(err).into_response(),
    }
}

fn not_found(state: &HttpState, path: &str) -> Response {
    let meta = PageMeta::site_default(&state.site, path);
    render_not_found_response(LayoutChrome::from_site(&state.site, meta))
}

async fn sitemap(State(state): State<HttpState>) -> Response {
    match state.sitemap.sitemap_xml().await {
        Ok(body) => xml_response(body, "application/xml"),
        Err(err) => HttpError::new(
            "infra::http::public::sitemap",
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to generate sitemap",
            err.to_string(),
        )
        .into_response(),
    }
}

async fn robots_txt(State(state): State<HttpState>) -> Response {
    match state.sitemap.robots_txt().await {
        Ok(body) => plain_response(body),
        Err(err) => HttpError::new(
            "infra::http::public::robots",
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to generate robots.txt",
            err.to_string(),
        )
        .into_response(),
    }
}

async fn health() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

fn xml_response(body: String, content_type: &str) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

fn plain_response(body: String) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Body::from(body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
