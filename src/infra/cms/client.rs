//! Minimal GraphQL-over-HTTP client for the headless CMS.

use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::application::repos::RepoError;

const BODY_EXCERPT_LIMIT: usize = 256;

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(serde::Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlMessage>>,
}

#[derive(serde::Deserialize)]
struct GraphQlMessage {
    message: String,
}

#[derive(Clone)]
pub struct GraphQlClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl GraphQlClient {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, RepoError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| RepoError::transport(format!("failed to build client: {err}")))?;
        Ok(Self { http, endpoint })
    }

    /// POST a GraphQL document and decode `data` into `T`.
    ///
    /// `op` names the operation for logs and metrics only; it is not sent to
    /// the CMS.
    pub async fn request<T: DeserializeOwned>(
        &self,
        op: &'static str,
        query: &'static str,
        variables: Value,
    ) -> Result<T, RepoError> {
        let started = Instant::now();
        counter!("vetrina_cms_request_total", "op" => op).increment(1);

        let result = self.dispatch(query, variables).await;
        let elapsed_ms = started.elapsed().as_millis() as f64;
        histogram!("vetrina_cms_request_ms", "op" => op).record(elapsed_ms);

        match result {
            Ok(value) => {
                debug!(
                    target = "vetrina::cms",
                    op, elapsed_ms, "content source request completed"
                );
                Ok(value)
            }
            Err(err) => {
                counter!("vetrina_cms_error_total", "op" => op).increment(1);
                Err(err)
            }
        }
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        query: &'static str,
        variables: Value,
    ) -> Result<T, RepoError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&GraphQlRequest { query, variables })
            .send()
            .await
            .map_err(|err| RepoError::transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_default();
            return Err(RepoError::Status {
                status: status.as_u16(),
                detail: excerpt(&body),
            });
        }

        let payload: GraphQlResponse<T> = response
            .json()
            .await
            .map_err(|err| RepoError::decode(err.to_string()))?;

        if let Some(errors) = payload.errors.filter(|errors| !errors.is_empty()) {
            let joined = errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join(" | ");
            return Err(RepoError::upstream(joined));
        }

        payload
            .data
            .ok_or_else(|| RepoError::decode("response carried neither data nor errors"))
    }
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.len() <= BODY_EXCERPT_LIMIT {
        return trimmed.to_string();
    }
    let mut cut = BODY_EXCERPT_LIMIT;
    while !trimmed.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…", &trimmed[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_truncates_long_bodies_on_char_boundaries() {
        let long = "é".repeat(300);
        let cut = excerpt(&long);
        assert!(cut.ends_with('…'));
        assert!(cut.len() <= BODY_EXCERPT_LIMIT + '…'.len_utf8());
    }

    #[test]
    fn excerpt_passes_short_bodies_through() {
        assert_eq!(excerpt("  oops  "), "oops");
    }
}
