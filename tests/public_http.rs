use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use tower::ServiceExt;
use url::Url;

use vetrina::application::content::{ContentLimits, ContentService};
use vetrina::application::repos::{ContentRepo, RepoError};
use vetrina::application::sitemap::SitemapService;
use vetrina::cache::{CacheConfig, ContentStore};
use vetrina::config::SiteSettings;
use vetrina::domain::entities::{
    LinkItem, Post, PostSummary, Project, ProjectCard, SelectedTerm, Term,
};
use vetrina::infra::http::{HttpState, build_router};

const HOOK_SECRET: &str = "hook-secret";

#[derive(Default)]
struct StubRepo {
    post_list_fetches: AtomicUsize,
}

fn term(db_id: i64, name: &str, parent: Option<i64>) -> Term {
    Term {
        id: format!("term:{db_id}"),
        db_id,
        name: name.to_string(),
        slug: name.to_lowercase(),
        parent_db_id: parent,
    }
}

#[async_trait]
impl ContentRepo for StubRepo {
    async fn list_posts(&self, _limit: u32) -> Result<Vec<PostSummary>, RepoError> {
        self.post_list_fetches.fetch_add(1, Ordering::Relaxed);
        Ok(vec![PostSummary {
            slug: "hello-world".to_string(),
            title: "Hello World".to_string(),
            published_at: None,
        }])
    }

    async fn post_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        if slug != "hello-world" {
            return Ok(None);
        }
        Ok(Some(Post {
            slug: slug.to_string(),
            title: "Hello World".to_string(),
            content_html: "<p>First post.</p>".to_string(),
            published_at: None,
            seo: None,
        }))
    }

    async fn list_projects(&self, _limit: u32) -> Result<Vec<ProjectCard>, RepoError> {
        Ok(vec![ProjectCard {
            slug: "vetrina".to_string(),
            title: "Vetrina".to_string(),
            role: "Author".to_string(),
            hero_image: None,
            tech_names: vec!["Backend".to_string()],
            start_date: Some("2024".to_string()),
            end_date: None,
        }])
    }

    async fn project_by_slug(&self, slug: &str) -> Result<Option<Project>, RepoError> {
        if slug != "vetrina" {
            return Ok(None);
        }
        Ok(Some(Project {
            slug: slug.to_string(),
            title: "Vetrina".to_string(),
            content_html: "<p>A portfolio server.</p>".to_string(),
            published_at: None,
            role: Some("Author".to_string()),
            start_date: Some("2024".to_string()),
            end_date: None,
            hero_image: None,
            tech_terms: vec![SelectedTerm {
                db_id: 2,
                name: "Go".to_string(),
            }],
            links: Vec::new(),
            seo: None,
        }))
    }

    async fn all_tech_terms(&self) -> Result<Vec<Term>, RepoError> {
        Ok(vec![
            term(1, "Backend", None),
            term(2, "Go", Some(1)),
            term(3, "Frontend", None),
            term(4, "React", Some(3)),
        ])
    }

    async fn links(&self) -> Result<Vec<LinkItem>, RepoError> {
        Ok(vec![LinkItem {
            label: "GitHub".to_string(),
            url: Url::parse("https://github.com").expect("static url"),
            description: Some("Code".to_string()),
        }])
    }
}

fn site() -> SiteSettings {
    SiteSettings {
        public_url: "https://example.life".to_string(),
        title: "Example Life".to_string(),
        description: "Portfolio and writing".to_string(),
        author: "M. Borntreger".to_string(),
        locale: "en_US".to_string(),
    }
}

fn build_app(secret: Option<&str>) -> (Router, Arc<StubRepo>) {
    let repo = Arc::new(StubRepo::default());
    let store = Arc::new(ContentStore::new(&CacheConfig::default()));
    let limits = ContentLimits {
        recent_posts: 3,
        recent_projects: 6,
        listing: 200,
    };

    let content = ContentService::new(
        repo.clone() as Arc<dyn ContentRepo>,
        Some(store.clone()),
        limits,
    );
    let sitemap = Arc::new(SitemapService::new(
        repo.clone() as Arc<dyn ContentRepo>,
        site(),
        200,
    ));

    let state = HttpState {
        content,
        sitemap,
        site: site(),
        store: Some(store),
        hooks_secret: secret.map(str::to_string),
    };

    (build_router(state), repo)
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[tokio::test]
async fn home_page_renders_recent_content() {
    let (app, _) = build_app(Some(HOOK_SECRET));

    let response = app.oneshot(get("/")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("Hello World"));
    assert!(body.contains("/blog/hello-world"));
    assert!(body.contains("Vetrina"));
    assert!(body.contains("\"@type\":\"WebSite\""));
}

#[tokio::test]
async fn post_page_carries_article_metadata() {
    let (app, _) = build_app(Some(HOOK_SECRET));

    let response = app
        .oneshot(get("/blog/hello-world"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("<p>First post.</p>"));
    assert!(body.contains("og:type\" content=\"article\""));
    assert!(body.contains("https://example.life/blog/hello-world"));
}

#[tokio::test]
async fn unknown_post_renders_not_found() {
    let (app, _) = build_app(Some(HOOK_SECRET));

    let response = app.oneshot(get("/blog/missing")).await.expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_text(response).await;
    assert!(body.contains("Page Not Found"));
}

#[tokio::test]
async fn project_page_shows_pruned_tech_tree() {
    let (app, _) = build_app(Some(HOOK_SECRET));

    let response = app
        .oneshot(get("/projects/vetrina"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    // Selected leaf and its ancestor survive; the unrelated branch is pruned.
    assert!(body.contains("Backend"));
    assert!(body.contains("Go"));
    assert!(!body.contains("React"));
}

#[tokio::test]
async fn sitemap_lists_content_urls() {
    let (app, _) = build_app(Some(HOOK_SECRET));

    let response = app.oneshot(get("/sitemap.xml")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("<loc>https://example.life/blog/hello-world</loc>"));
    assert!(body.contains("<loc>https://example.life/projects/vetrina</loc>"));
}

#[tokio::test]
async fn revalidate_requires_the_secret() {
    let (app, _) = build_app(Some(HOOK_SECRET));

    let response = app
        .clone()
        .oneshot(post_json("/api/revalidate?secret=wrong", r#"{"tag":"posts"}"#))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(post_json("/api/revalidate", r#"{"tag":"posts"}"#))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn revalidate_without_configured_secret_is_unavailable() {
    let (app, _) = build_app(None);

    let response = app
        .oneshot(post_json(
            &format!("/api/revalidate?secret={HOOK_SECRET}"),
            r#"{"tag":"posts"}"#,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn revalidate_rejects_unknown_targets() {
    let (app, _) = build_app(Some(HOOK_SECRET));

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/revalidate?secret={HOOK_SECRET}"),
            r#"{"tag":"feed"}"#,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(post_json(
            &format!("/api/revalidate?secret={HOOK_SECRET}"),
            r#"{}"#,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn revalidate_drops_cached_listings() {
    let (app, repo) = build_app(Some(HOOK_SECRET));

    // Two reads, one upstream fetch.
    let _ = app.clone().oneshot(get("/blog")).await.expect("response");
    let _ = app.clone().oneshot(get("/blog")).await.expect("response");
    assert_eq!(repo.post_list_fetches.load(Ordering::Relaxed), 1);

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/revalidate?secret={HOOK_SECRET}"),
            r#"{"tag":"posts"}"#,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("\"revalidated\":true"));

    let _ = app.oneshot(get("/blog")).await.expect("response");
    assert_eq!(repo.post_list_fetches.load(Ordering::Relaxed), 2);
}

#[tokio::test]
async fn preview_sets_cookie_and_redirects() {
    let (app, _) = build_app(Some(HOOK_SECRET));

    let response = app
        .oneshot(get(&format!(
            "/api/preview?secret={HOOK_SECRET}&slug=vetrina&type=project"
        )))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok()),
        Some("/projects/vetrina")
    );
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("set-cookie header");
    assert!(cookie.starts_with("preview=1"));
}

#[tokio::test]
async fn preview_cookie_bypasses_the_cache() {
    let (app, repo) = build_app(Some(HOOK_SECRET));

    let _ = app.clone().oneshot(get("/blog")).await.expect("response");
    assert_eq!(repo.post_list_fetches.load(Ordering::Relaxed), 1);

    let request = Request::builder()
        .uri("/blog")
        .header(header::COOKIE, "preview=1")
        .body(Body::empty())
        .expect("request");
    let _ = app.oneshot(request).await.expect("response");
    assert_eq!(repo.post_list_fetches.load(Ordering::Relaxed), 2);
}

#[tokio::test]
async fn health_endpoint_responds() {
    let (app, _) = build_app(Some(HOOK_SECRET));

    let response = app.oneshot(get("/_health")).await.expect("response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
