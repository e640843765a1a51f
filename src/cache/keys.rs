//! Invalidation targets for the content cache.
//!
//! Revalidation webhooks name either a public path or a content section; both
//! resolve to a `RevalidateTarget` that the store knows how to drop.

use std::str::FromStr;

/// Coarse content groups addressable by the `tag` field of a revalidate call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentSection {
    Posts,
    Projects,
    Terms,
    Links,
    All,
}

impl FromStr for ContentSection {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "posts" => Ok(ContentSection::Posts),
            "projects" => Ok(ContentSection::Projects),
            "terms" => Ok(ContentSection::Terms),
            "links" => Ok(ContentSection::Links),
            "all" => Ok(ContentSection::All),
            _ => Err(()),
        }
    }
}

/// A single invalidation request resolved from a webhook payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RevalidateTarget {
    /// One post entry plus the recent-posts listing.
    PostSlug(String),
    /// One project entry plus the recent-projects listing.
    ProjectSlug(String),
    Section(ContentSection),
}

/// Map a public path onto an invalidation target.
///
/// `/` maps to the whole store since the home page aggregates every section.
/// Unknown paths yield `None` and the webhook reports them as a bad request.
pub fn parse_path_target(path: &str) -> Option<RevalidateTarget> {
    let trimmed = path.trim().trim_end_matches('/');

    match trimmed {
        "" => return Some(RevalidateTarget::Section(ContentSection::All)),
        "/blog" => return Some(RevalidateTarget::Section(ContentSection::Posts)),
        "/projects" => return Some(RevalidateTarget::Section(ContentSection::Projects)),
        "/links" => return Some(RevalidateTarget::Section(ContentSection::Links)),
        _ => {}
    }

    if let Some(slug) = trimmed.strip_prefix("/blog/") {
        if !slug.is_empty() && !slug.contains('/') {
            return Some(RevalidateTarget::PostSlug(slug.to_string()));
        }
    }
    if let Some(slug) = trimmed.strip_prefix("/projects/") {
        if !slug.is_empty() && !slug.contains('/') {
            return Some(RevalidateTarget::ProjectSlug(slug.to_string()));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_names_parse() {
        assert_eq!("posts".parse(), Ok(ContentSection::Posts));
        assert_eq!("all".parse(), Ok(ContentSection::All));
        assert!(ContentSection::from_str("feed").is_err());
    }

    #[test]
    fn paths_resolve_to_targets() {
        assert_eq!(
            parse_path_target("/blog/hello-world"),
            Some(RevalidateTarget::PostSlug("hello-world".to_string()))
        );
        assert_eq!(
            parse_path_target("/projects/vetrina/"),
            Some(RevalidateTarget::ProjectSlug("vetrina".to_string()))
        );
        assert_eq!(
            parse_path_target("/blog"),
            Some(RevalidateTarget::Section(ContentSection::Posts))
        );
        assert_eq!(
            parse_path_target("/"),
            Some(RevalidateTarget::Section(ContentSection::All))
        );
    }

    #[test]
    fn unknown_and_nested_paths_are_rejected() {
        assert_eq!(parse_path_target("/admin"), None);
        assert_eq!(parse_path_target("/blog/a/b"), None);
    }
}
