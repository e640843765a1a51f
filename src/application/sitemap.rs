//! Sitemap service for sitemap.xml and robots.txt generation.
//!
//! Walks the CMS slug listings so the HTTP layer stays focused on
//! request/response handling.

use std::sync::Arc;

use thiserror::Error;
use time::format_description::well_known::Rfc3339;

use crate::application::metadata::canonical_url;
use crate::application::repos::{ContentRepo, RepoError};
use crate::config::SiteSettings;

#[derive(Clone)]
pub struct SitemapService {
    repo: Arc<dyn ContentRepo>,
    site: SiteSettings,
    listing_limit: u32,
}

#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("failed to list content: {0}")]
    Repo(#[from] RepoError),
}

impl SitemapService {
    pub fn new(repo: Arc<dyn ContentRepo>, site: SiteSettings, listing_limit: u32) -> Self {
        Self {
            repo,
            site,
            listing_limit,
        }
    }

    pub async fn sitemap_xml(&self) -> Result<String, SitemapError> {
        let mut entries = Vec::new();
        let base = &self.site.public_url;

        entries.push(sitemap_entry(base, "/", None));
        entries.push(sitemap_entry(base, "/blog", None));
        entries.push(sitemap_entry(base, "/projects", None));
        entries.push(sitemap_entry(base, "/links", None));

        for post in self.repo.list_posts(self.listing_limit).await? {
            let lastmod = post
                .published_at
                .and_then(|dt| dt.format(&Rfc3339).ok());
            entries.push(sitemap_entry(
                base,
                &format!("/blog/{}", post.slug),
                lastmod,
            ));
        }

        for project in self.repo.list_projects(self.listing_limit).await? {
            entries.push(sitemap_entry(
                base,
                &format!("/projects/{}", project.slug),
                None,
            ));
        }

        let mut xml = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
        );
        for entry in entries {
            xml.push_str(&entry);
        }
        xml.push_str("</urlset>\n");
        Ok(xml)
    }

    pub async fn robots_txt(&self) -> Result<String, SitemapError> {
        let sitemap_url = canonical_url(&self.site.public_url, "/sitemap.xml");
        Ok(format!(
            "User-agent: *\nAllow: /\nSitemap: {sitemap_url}\n"
        ))
    }
}

fn sitemap_entry(base: &str, path: &str, lastmod: Option<String>) -> String {
    let loc = canonical_url(base, path);
    match lastmod {
        Some(lastmod) => format!("  <url><loc>{loc}</loc><lastmod>{lastmod}</lastmod></url>\n"),
        None => format!("  <url><loc>{loc}</loc></url>\n"),
    }
}
