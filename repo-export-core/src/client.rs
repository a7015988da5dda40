//! reqwest-backed [`RemoteClient`].
//!
//! Attaches the bearer credential, user agent and accept header to every
//! request, applies the per-request timeout, and hands the raw response back.
//! No retries.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::Client;

use crate::config::ClientConfig;
use crate::contract::{ApiRequest, ApiResponse, RemoteClient, TransportError, ACCEPT_JSON};

pub struct GitHubClient {
    http: Client,
    base_url: String,
    token: String,
    user_agent: String,
}

impl GitHubClient {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                tracing::error!(error = ?e, "Failed to build HTTP client");
                TransportError::from(e)
            })?;
        tracing::info!(
            base_url = %config.base_url,
            token_set = !config.token.is_empty(),
            timeout = ?config.request_timeout,
            "Initialised GitHubClient"
        );
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(), // avoid "//"
            token: config.token.clone(),
            user_agent: config.user_agent.clone(),
        })
    }

    /// Absolute URLs returned by the API are used as-is.
    fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }
}

#[async_trait]
impl RemoteClient for GitHubClient {
    async fn request(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.url_for(&request.path);
        tracing::debug!(url = %url, query = ?request.query, "GET");

        let resp = self
            .http
            .get(&url)
            .query(&request.query)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, request.accept.as_deref().unwrap_or(ACCEPT_JSON))
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(url = %url, error = ?e, "HTTP request failed");
                TransportError::from(e)
            })?;

        let status = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .filter_map(|(k, v)| {
                v.to_str()
                    .ok()
                    .map(|v| (k.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = resp.text().await.map_err(TransportError::from)?;

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}
