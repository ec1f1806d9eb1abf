//! HTTP adapter for console list endpoints.

use async_trait::async_trait;
use gatedeck_application::{ListDataSource, ListEnvelope, ListRequest};
use gatedeck_core::{AppError, AppResult};
use url::Url;

/// Header carrying the signed-in user id on console API calls.
pub const USER_ID_HEADER: &str = "New-Api-User";

/// Reqwest implementation of the list data source port.
#[derive(Clone)]
pub struct HttpListDataSource {
    http_client: reqwest::Client,
    base_url: Url,
    user_id: Option<String>,
}

impl HttpListDataSource {
    /// Creates a data source rooted at `base_url`.
    #[must_use]
    pub fn new(http_client: reqwest::Client, base_url: Url, user_id: Option<String>) -> Self {
        Self {
            http_client,
            base_url: with_trailing_slash(base_url),
            user_id,
        }
    }

    /// Resolves the full request URL, query string included.
    pub fn build_url(&self, request: &ListRequest) -> AppResult<Url> {
        let mut url = self
            .base_url
            .join(request.endpoint.trim_start_matches('/'))
            .map_err(|error| {
                AppError::Validation(format!(
                    "invalid list endpoint '{}': {error}",
                    request.endpoint
                ))
            })?;

        if !request.parameters.is_empty() {
            let mut pairs = url.query_pairs_mut();
            pairs.clear();
            for (name, value) in &request.parameters {
                pairs.append_pair(name, value);
            }
        }

        Ok(url)
    }
}

#[async_trait]
impl ListDataSource for HttpListDataSource {
    async fn fetch_page(&self, request: ListRequest) -> AppResult<ListEnvelope> {
        let url = self.build_url(&request)?;
        let mut builder = self.http_client.get(url);
        if let Some(user_id) = &self.user_id {
            builder = builder.header(USER_ID_HEADER, user_id.as_str());
        }

        let response = builder.send().await.map_err(|error| {
            AppError::Transport(format!(
                "list request to '{}' failed: {error}",
                request.endpoint
            ))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<response body unavailable>".to_owned());
            return Err(AppError::Transport(format!(
                "list endpoint '{}' answered with status {status}: {body}",
                request.endpoint
            )));
        }

        let body = response.bytes().await.map_err(|error| {
            AppError::Transport(format!(
                "failed to read list response from '{}': {error}",
                request.endpoint
            ))
        })?;

        serde_json::from_slice(&body).map_err(|error| {
            AppError::Transport(format!(
                "invalid list response from '{}': {error}",
                request.endpoint
            ))
        })
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
