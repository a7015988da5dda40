use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::ExportError;

pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_USER_AGENT: &str = concat!("repo-export/", env!("CARGO_PKG_VERSION"));

/// The repository being exported. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryHandle {
    pub owner: String,
    pub name: String,
}

impl RepositoryHandle {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// `/repos/{owner}/{name}`, the root of every repository-scoped route.
    pub fn api_path(&self) -> String {
        format!("/repos/{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepositoryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepositoryHandle {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split('/').collect::<Vec<_>>().as_slice() {
            [owner, name] if !owner.is_empty() && !name.is_empty() => {
                Ok(RepositoryHandle::new(*owner, *name))
            }
            _ => Err(ExportError::InvalidRepository(s.to_string())),
        }
    }
}

/// How the HTTP client reaches the API.
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub token: String,
    pub user_agent: String,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            token: token.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

// The token stays out of logs.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Tuning for one export run, passed by reference into every stage.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Upper bound on in-flight blob or comment requests.
    pub concurrency: usize,
    /// Consult the quota endpoint before the first real request.
    pub check_quota: bool,
    /// Wall-clock budget for the whole export. `None` waits forever.
    pub deadline: Option<Duration>,
    pub issues_per_page: u32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            concurrency: 8,
            check_quota: true,
            deadline: Some(Duration::from_secs(30 * 60)),
            issues_per_page: 100,
        }
    }
}

impl ExportOptions {
    pub fn trace_loaded(&self) {
        info!(
            concurrency = self.concurrency,
            check_quota = self.check_quota,
            deadline = ?self.deadline,
            "Loaded ExportOptions"
        );
        debug!(?self, "ExportOptions loaded (full debug)");
    }

    /// Concurrency clamped to at least one worker.
    pub fn workers(&self) -> usize {
        self.concurrency.max(1)
    }
}
