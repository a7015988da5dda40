//! Pull request aggregator: one `state=all` request, no pagination.
//!
//! Anything past the remote's default page size is not exported, and pull
//! request comments are never fetched.

use serde::Deserialize;

use crate::config::RepositoryHandle;
use crate::contract::{get_json, ApiRequest, RemoteClient};
use crate::records::{ItemState, PullRequestRecord};

#[derive(Debug, Deserialize)]
struct PullRequestPayload {
    number: u64,
    title: String,
    state: ItemState,
    created_at: String,
    #[serde(default)]
    body: Option<String>,
}

/// Any failure yields an empty list.
pub async fn fetch_pull_requests<C>(client: &C, repo: &RepositoryHandle) -> Vec<PullRequestRecord>
where
    C: RemoteClient + ?Sized,
{
    let request = ApiRequest::new(format!("{}/pulls", repo.api_path())).query("state", "all");
    let Some(pulls) = get_json::<_, Vec<PullRequestPayload>>(client, request).await else {
        tracing::warn!(repository = %repo, "[PULLS] Pull request listing unavailable, exporting none");
        return Vec::new();
    };

    tracing::info!(count = pulls.len(), "[PULLS] Fetched pull requests");
    pulls
        .into_iter()
        .map(|pr| PullRequestRecord {
            number: pr.number,
            title: pr.title,
            state: pr.state,
            created_at: pr.created_at,
            body: pr.body,
        })
        .collect()
}
