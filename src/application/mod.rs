//! Application services layer scaffolding.

pub mod content;
pub mod error;
pub mod metadata;
pub mod repos;
pub mod sitemap;
