//! GraphQL documents issued against the CMS.
//!
//! The schema is WPGraphQL-shaped: content types expose `nodes` connections,
//! taxonomy terms expose `parentDatabaseId` only on hierarchical terms (hence
//! the inline fragments), and per-entry SEO lives under a `seo` field.

pub const LIST_POSTS: &str = r#"
query ListPosts($limit: Int!) {
  posts(first: $limit, where: { orderby: { field: DATE, order: DESC } }) {
    nodes { slug title date }
  }
}
"#;

pub const POST_BY_SLUG: &str = r#"
query PostBySlug($slug: ID!) {
  post(id: $slug, idType: SLUG) {
    slug
    title
    content
    date
    seo {
      title
      description
      canonicalUrl
      openGraph {
        title
        description
        image { url width height }
        articleMeta { publishedTime modifiedTime }
      }
    }
  }
}
"#;

pub const LIST_PROJECTS: &str = r#"
query ListProjects($limit: Int!) {
  projects(first: $limit, where: { orderby: { field: DATE, order: DESC } }) {
    nodes {
      slug
      title
      projectFields {
        role
        startDate
        endDate
        techStack {
          nodes {
            id
            databaseId
            name
            ... on HierarchicalTermNode { parentDatabaseId }
          }
        }
        heroImage { node { sourceUrl altText } }
      }
    }
  }
}
"#;

pub const PROJECT_BY_SLUG: &str = r#"
query ProjectBySlug($slug: ID!) {
  project(id: $slug, idType: SLUG) {
    slug
    title
    content
    date
    seo {
      title
      description
      canonicalUrl
      openGraph {
        title
        description
        image { url width height }
        articleMeta { publishedTime modifiedTime }
      }
    }
    projectFields {
      role
      startDate
      endDate
      techStack {
        nodes {
          id
          databaseId
          name
          ... on HierarchicalTermNode { parentDatabaseId }
        }
      }
      heroImage { node { sourceUrl altText } }
      links { label url }
    }
  }
}
"#;

pub const ALL_TECH_TERMS: &str = r#"
query AllTechTerms($tax: [TaxonomyEnum!], $limit: Int!) {
  terms(first: $limit, where: { taxonomies: $tax, hideEmpty: false }) {
    nodes {
      id
      databaseId
      name
      slug
      ... on HierarchicalTermNode { parentDatabaseId }
    }
  }
}
"#;

pub const LINKS_PAGE: &str = r#"
query LinksPage {
  page(id: "/links", idType: URI) {
    linksFields {
      items { label url description }
    }
  }
}
"#;
