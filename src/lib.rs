//! Vetrina: a server-rendered portfolio and blog front end for a headless
//! GraphQL CMS.
//!
//! The crate is layered the usual way: `domain` holds the neutral content
//! records and the taxonomy tree logic, `application` the services composed
//! over the `ContentRepo` seam, `infra` the CMS adapter and the HTTP surface,
//! `presentation` the askama view models, and `cache` the TTL'd content store
//! behind the revalidation hooks.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
