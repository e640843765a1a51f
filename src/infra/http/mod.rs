mod hooks;
mod middleware;
mod public;

use std::sync::Arc;

use crate::application::content::ContentService;
use crate::application::sitemap::SitemapService;
use crate::cache::ContentStore;
use crate::config::SiteSettings;

pub use public::build_router;

/// Shared state for every public handler.
#[derive(Clone)]
pub struct HttpState {
    pub content: ContentService,
    pub sitemap: Arc<SitemapService>,
    pub site: SiteSettings,
    pub store: Option<Arc<ContentStore>>,
    pub hooks_secret: Option<String>,
}
