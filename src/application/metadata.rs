//! Page metadata assembly: titles, descriptions, canonical URLs, Open Graph
//! fields and JSON-LD payloads.
//!
//! CMS-provided SEO overrides win; everything else falls back to site-level
//! defaults, with descriptions derived from the sanitized body when the CMS
//! supplies none.

use serde_json::json;
use time::format_description::well_known::Rfc3339;

use crate::config::SiteSettings;
use crate::domain::entities::{Post, Project, RemoteImage};

const DESCRIPTION_LIMIT: usize = 180;

#[derive(Clone)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub canonical: String,
    pub og_title: String,
    pub og_description: String,
    pub og_type: &'static str,
    pub og_image: Option<RemoteImage>,
    pub og_site_name: String,
    pub og_locale: String,
    pub json_ld: Option<String>,
}

impl PageMeta {
    /// Site-level defaults for a given path; used by listing pages.
    pub fn site_default(site: &SiteSettings, path: &str) -> Self {
        Self {
            title: site.title.clone(),
            description: site.description.clone(),
            canonical: canonical_url(&site.public_url, path),
            og_title: site.title.clone(),
            og_description: site.description.clone(),
            og_type: "website",
            og_image: None,
            og_site_name: site.title.clone(),
            og_locale: site.locale.clone(),
            json_ld: None,
        }
    }

    pub fn for_home(site: &SiteSettings) -> Self {
        let mut meta = Self::site_default(site, "/");
        meta.json_ld = Some(website_json_ld(site));
        meta
    }

    pub fn for_post(site: &SiteSettings, post: &Post) -> Self {
        let path = format!("/blog/{}", post.slug);
        let seo = post.seo.clone().unwrap_or_default();

        let title = seo.title.unwrap_or_else(|| post.title.clone());
        let description = fallback_description(
            seo.description.as_deref().unwrap_or(""),
            &summarize_html(&post.content_html, DESCRIPTION_LIMIT),
            &site.description,
        );
        let canonical = seo
            .canonical_url
            .unwrap_or_else(|| canonical_url(&site.public_url, &path));

        let published = post
            .published_at
            .and_then(|dt| dt.format(&Rfc3339).ok())
            .or(seo.published_time.clone());

        let json_ld = json!({
            "@context": "https://schema.org",
            "@type": "BlogPosting",
            "headline": post.title,
            "url": canonical,
            "datePublished": published,
            "dateModified": seo.modified_time,
            "author": { "@type": "Person", "name": site.author },
        })
        .to_string();

        Self {
            og_title: seo.og_title.unwrap_or_else(|| title.clone()),
            og_description: seo
                .og_description
                .unwrap_or_else(|| description.clone()),
            og_type: "article",
            og_image: seo.og_image,
            og_site_name: site.title.clone(),
            og_locale: site.locale.clone(),
            json_ld: Some(json_ld),
            title,
            description,
            canonical,
        }
    }

    pub fn for_project(site: &SiteSettings, project: &Project) -> Self {
        let path = format!("/projects/{}", project.slug);
        let seo = project.seo.clone().unwrap_or_default();

        let title = seo.title.unwrap_or_else(|| project.title.clone());
        let description = fallback_description(
            seo.description.as_deref().unwrap_or(""),
            &summarize_html(&project.content_html, DESCRIPTION_LIMIT),
            &site.description,
        );
        let canonical = seo
            .canonical_url
            .unwrap_or_else(|| canonical_url(&site.public_url, &path));

        let json_ld = json!({
            "@context": "https://schema.org",
            "@type": "CreativeWork",
            "name": project.title,
            "url": canonical,
            "author": { "@type": "Person", "name": site.author },
        })
        .to_string();

        let og_image = seo.og_image.or_else(|| project.hero_image.clone());

        Self {
            og_title: seo.og_title.unwrap_or_else(|| title.clone()),
            og_description: seo
                .og_description
                .unwrap_or_else(|| description.clone()),
            og_type: "article",
            og_image,
            og_site_name: site.title.clone(),
            og_locale: site.locale.clone(),
            json_ld: Some(json_ld),
            title,
            description,
            canonical,
        }
    }
}

fn website_json_ld(site: &SiteSettings) -> String {
    json!({
        "@context": "https://schema.org",
        "@type": "WebSite",
        "name": site.title,
        "url": normalize_public_site_url(&site.public_url),
        "author": { "@type": "Person", "name": site.author },
    })
    .to_string()
}

fn fallback_description(explicit: &str, derived: &str, site_default: &str) -> String {
    let explicit = explicit.trim();
    if !explicit.is_empty() {
        return explicit.to_string();
    }
    let derived = derived.trim();
    if !derived.is_empty() {
        return derived.to_string();
    }
    site_default.to_string()
}

/// Strip tags and collapse whitespace to derive a plain-text summary.
pub fn summarize_html(html: &str, max_len: usize) -> String {
    let mut text = String::with_capacity(max_len);
    let mut in_tag = false;
    let mut last_was_space = false;

    for ch in html.chars() {
        match ch {
            '<' => {
                in_tag = true;
                continue;
            }
            '>' => {
                in_tag = false;
                last_was_space = false;
                continue;
            }
            _ if in_tag => continue,
            c if c.is_whitespace() => {
                if !last_was_space && !text.is_empty() {
                    text.push(' ');
                }
                last_was_space = true;
            }
            c => {
                text.push(c);
                last_was_space = false;
            }
        }

        if text.len() >= max_len {
            break;
        }
    }

    text.trim().to_string()
}

pub fn canonical_url(base: &str, path: &str) -> String {
    let root = normalize_public_site_url(base);
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() {
        root
    } else {
        format!("{root}{trimmed}")
    }
}

fn normalize_public_site_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    format!("{trimmed}/")
}
