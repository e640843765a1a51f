use std::{process, sync::Arc};

use tokio::signal;
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;
use vetrina::{
    application::{
        content::{ContentLimits, ContentService},
        error::AppError,
        repos::ContentRepo,
        sitemap::SitemapService,
    },
    cache::ContentStore,
    config,
    domain::terms::build_term_tree,
    infra::{
        cms::CmsContentRepo,
        error::InfraError,
        http::{self, HttpState},
        telemetry,
    },
};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Check(_) => run_check(settings).await,
    }
}

fn build_repo(settings: &config::Settings) -> Result<Arc<CmsContentRepo>, AppError> {
    let endpoint = settings
        .content
        .graphql_endpoint
        .clone()
        .ok_or_else(|| InfraError::configuration("content.graphql_endpoint is not configured"))
        .map_err(AppError::from)?;

    CmsContentRepo::new(
        endpoint,
        settings.content.request_timeout,
        settings.content.term_page_size,
    )
    .map(Arc::new)
    .map_err(AppError::from)
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repo = build_repo(&settings)?;

    let store = settings
        .cache
        .enabled
        .then(|| Arc::new(ContentStore::new(&settings.cache)));

    let limits = ContentLimits {
        recent_posts: settings.content.recent_posts,
        recent_projects: settings.content.recent_projects,
        listing: settings.content.listing_limit,
    };

    let content = ContentService::new(
        repo.clone() as Arc<dyn ContentRepo>,
        store.clone(),
        limits,
    );
    let sitemap = Arc::new(SitemapService::new(
        repo as Arc<dyn ContentRepo>,
        settings.site.clone(),
        settings.content.listing_limit,
    ));

    let state = HttpState {
        content,
        sitemap,
        site: settings.site.clone(),
        store,
        hooks_secret: settings.hooks.secret.clone(),
    };
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "vetrina::serve",
        addr = %settings.server.addr,
        cache = settings.cache.enabled,
        "listening"
    );

    let window = settings.server.graceful_shutdown;
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal(window))
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal(window: std::time::Duration) {
    if signal::ctrl_c().await.is_err() {
        return;
    }
    info!(
        target = "vetrina::serve",
        grace_seconds = window.as_secs(),
        "shutdown signal received, draining connections"
    );

    // In-flight requests get the configured window, then the process goes
    // down hard.
    tokio::spawn(async move {
        tokio::time::sleep(window).await;
        error!(
            target = "vetrina::serve",
            "graceful shutdown window elapsed, exiting"
        );
        process::exit(1);
    });
}

async fn run_check(settings: config::Settings) -> Result<(), AppError> {
    let repo = build_repo(&settings)?;

    let terms = repo.all_tech_terms().await?;
    let forest = build_term_tree(&terms);
    let posts = repo.list_posts(settings.content.listing_limit).await?;
    let projects = repo.list_projects(settings.content.listing_limit).await?;

    info!(
        target = "vetrina::check",
        terms = terms.len(),
        term_roots = forest.len(),
        posts = posts.len(),
        projects = projects.len(),
        "content source reachable"
    );

    Ok(())
}
