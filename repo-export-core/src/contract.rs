//! # contract: the remote client seam
//!
//! This module defines the single trait (`RemoteClient`) every pipeline stage
//! talks to, plus the plain request/response types that cross it.
//!
//! ## Interface
//! - [`RemoteClient::request`] issues one authenticated GET and returns the raw
//!   status, headers and body. It never retries and never interprets status
//!   codes; each caller decides whether a non-2xx is fatal or degradable.
//! - The production implementation lives in [`crate::client::GitHubClient`].
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall` so integration tests can script the
//!   remote service response by response (see `MockRemoteClient`).

use async_trait::async_trait;
use mockall::automock;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Default media type for REST calls.
pub const ACCEPT_JSON: &str = "application/vnd.github+json";

/// Media type required by the classic projects preview endpoints.
pub const ACCEPT_CLASSIC_PROJECTS: &str = "application/vnd.github.inertia-preview+json";

/// One outbound GET request.
///
/// `path` is either relative to the API root (`/repos/o/r/issues`) or an
/// absolute URL handed back by the remote service itself (blob and comment URLs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
    pub accept: Option<String>,
}

impl ApiRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
            accept: None,
        }
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn accept(mut self, media_type: &str) -> Self {
        self.accept = Some(media_type.to_string());
        self
    }

    /// Value of a query parameter, if set.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A completed HTTP exchange, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// The request never produced a response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("request timed out")]
    Timeout,

    #[error("failed to read response body: {0}")]
    Body(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_body() || e.is_decode() {
            TransportError::Body(e.to_string())
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

/// Trait for issuing authenticated requests against the source-hosting API.
/// Implemented by the reqwest-backed client and by test mocks.
///
/// The trait is `Send` + `Sync` so a single client can be shared by the
/// concurrent file and comment fetches.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Perform one GET. Non-2xx statuses are returned as `Ok` responses.
    async fn request(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Fetch `request` and decode a 2xx JSON body.
///
/// Returns `None` on transport failure, non-success status or undecodable
/// body, logging which of the three happened. Used wherever a failure only
/// degrades the export.
pub(crate) async fn get_json<C, T>(client: &C, request: ApiRequest) -> Option<T>
where
    C: RemoteClient + ?Sized,
    T: DeserializeOwned,
{
    let path = request.path.clone();
    match client.request(request).await {
        Ok(resp) if resp.is_success() => match resp.json::<T>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(path = %path, error = ?e, "Failed to decode response JSON");
                None
            }
        },
        Ok(resp) => {
            tracing::warn!(path = %path, status = resp.status, "Remote returned non-success status");
            None
        }
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "Request failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let resp = ApiResponse::new(200, "[]").with_header("Link", "<x>; rel=\"last\"");
        assert_eq!(resp.header("link"), Some("<x>; rel=\"last\""));
        assert_eq!(resp.header("etag"), None);
    }

    #[test]
    fn only_2xx_is_success() {
        assert!(ApiResponse::new(204, "").is_success());
        assert!(!ApiResponse::new(304, "").is_success());
        assert!(!ApiResponse::new(404, "").is_success());
    }

    #[tokio::test]
    async fn get_json_swallows_failures() {
        let mut client = MockRemoteClient::new();
        client.expect_request().returning(|req| match req.path.as_str() {
            "/ok" => Ok(ApiResponse::new(200, "[1,2]")),
            "/bad-json" => Ok(ApiResponse::new(200, "{")),
            "/missing" => Ok(ApiResponse::new(404, "{}")),
            _ => Err(TransportError::Timeout),
        });

        let ok: Option<Vec<u32>> = get_json(&client, ApiRequest::new("/ok")).await;
        assert_eq!(ok, Some(vec![1, 2]));
        let bad: Option<Vec<u32>> = get_json(&client, ApiRequest::new("/bad-json")).await;
        assert!(bad.is_none());
        let missing: Option<Vec<u32>> = get_json(&client, ApiRequest::new("/missing")).await;
        assert!(missing.is_none());
        let down: Option<Vec<u32>> = get_json(&client, ApiRequest::new("/down")).await;
        assert!(down.is_none());
    }
}
