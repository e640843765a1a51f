//! Editorial webhooks: cache revalidation and draft preview.
//!
//! Both endpoints require the shared hook secret and compare it in constant
//! time. They exist for the CMS to call, not for browsers.

use axum::{
    Json,
    body::Body,
    extract::{Query, State, rejection::JsonRejection},
    http::{
        StatusCode,
        header::{LOCATION, SET_COOKIE},
    },
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use subtle::ConstantTimeEq;

use crate::application::error::HttpError;
use crate::cache::{RevalidateTarget, parse_path_target};

use super::{HttpState, public::PREVIEW_COOKIE};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct SecretQuery {
    secret: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct RevalidateBody {
    path: Option<String>,
    tag: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct PreviewQuery {
    secret: Option<String>,
    slug: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

fn verify_secret(
    source: &'static str,
    configured: Option<&str>,
    provided: Option<&str>,
) -> Result<(), HttpError> {
    let Some(configured) = configured else {
        return Err(HttpError::new(
            source,
            StatusCode::SERVICE_UNAVAILABLE,
            "Hooks not configured",
            "no hook secret is configured",
        ));
    };

    let provided = provided.unwrap_or_default();
    let matches = configured.len() == provided.len()
        && bool::from(configured.as_bytes().ct_eq(provided.as_bytes()));
    if !matches {
        return Err(HttpError::new(
            source,
            StatusCode::UNAUTHORIZED,
            "Invalid secret",
            "hook secret mismatch",
        ));
    }
    Ok(())
}

pub(super) async fn revalidate(
    State(state): State<HttpState>,
    Query(query): Query<SecretQuery>,
    body: Result<Json<RevalidateBody>, JsonRejection>,
) -> Response {
    const SOURCE: &str = "infra::http::hooks::revalidate";

    if let Err(err) = verify_secret(
        SOURCE,
        state.hooks_secret.as_deref(),
        query.secret.as_deref(),
    ) {
        return err.into_response();
    }

    let Ok(Json(body)) = body else {
        return HttpError::new(
            SOURCE,
            StatusCode::BAD_REQUEST,
            "Bad request",
            "request body is not valid JSON",
        )
        .into_response();
    };

    let mut targets: Vec<RevalidateTarget> = Vec::new();

    if let Some(path) = body.path.as_deref() {
        match parse_path_target(path) {
            Some(target) => targets.push(target),
            None => {
                return HttpError::new(
                    SOURCE,
                    StatusCode::BAD_REQUEST,
                    "Bad request",
                    format!("path `{path}` does not map to cached content"),
                )
                .into_response();
            }
        }
    }

    if let Some(tag) = body.tag.as_deref() {
        match tag.parse() {
            Ok(section) => targets.push(RevalidateTarget::Section(section)),
            Err(()) => {
                return HttpError::new(
                    SOURCE,
                    StatusCode::BAD_REQUEST,
                    "Bad request",
                    format!("unknown tag `{tag}`"),
                )
                .into_response();
            }
        }
    }

    if targets.is_empty() {
        return HttpError::new(
            SOURCE,
            StatusCode::BAD_REQUEST,
            "Bad request",
            "expected a `path` or `tag` field",
        )
        .into_response();
    }

    if let Some(store) = state.store.as_deref() {
        for target in &targets {
            store.apply(target);
        }
    }

    Json(json!({ "revalidated": true })).into_response()
}

pub(super) async fn preview(
    State(state): State<HttpState>,
    Query(query): Query<PreviewQuery>,
) -> Response {
    const SOURCE: &str = "infra::http::hooks::preview";

    if let Err(err) = verify_secret(
        SOURCE,
        state.hooks_secret.as_deref(),
        query.secret.as_deref(),
    ) {
        return err.into_response();
    }

    let Some(slug) = query.slug.as_deref().filter(|slug| !slug.is_empty()) else {
        return HttpError::new(
            SOURCE,
            StatusCode::BAD_REQUEST,
            "Bad request",
            "expected a `slug` parameter",
        )
        .into_response();
    };

    let path = match query.kind.as_deref() {
        Some("project") => format!("/projects/{slug}"),
        _ => format!("/blog/{slug}"),
    };

    Response::builder()
        .status(StatusCode::TEMPORARY_REDIRECT)
        .header(LOCATION, path)
        .header(
            SET_COOKIE,
            format!("{PREVIEW_COOKIE}=1; Path=/; HttpOnly; SameSite=Lax"),
        )
        .body(Body::empty())
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
