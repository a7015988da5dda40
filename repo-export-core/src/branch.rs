//! Branch resolution: `main`, then `master`, then give up.

use crate::config::RepositoryHandle;
use crate::contract::{ApiRequest, RemoteClient};
use crate::error::ExportError;

pub const PRIMARY_BRANCH: &str = "main";
pub const SECONDARY_BRANCH: &str = "master";

/// Name of the first candidate branch whose tree can be listed.
///
/// Probes the non-recursive tree so the recursive listing is only fetched
/// once, by the tree fetcher. Any non-success status or transport failure
/// moves on to the next candidate.
pub async fn resolve_branch<C>(client: &C, repo: &RepositoryHandle) -> Result<String, ExportError>
where
    C: RemoteClient + ?Sized,
{
    let candidates = [PRIMARY_BRANCH, SECONDARY_BRANCH];
    for branch in candidates {
        let request = ApiRequest::new(format!("{}/git/trees/{}", repo.api_path(), branch));
        match client.request(request).await {
            Ok(resp) if resp.is_success() => {
                tracing::info!(repository = %repo, branch, "[BRANCH] Resolved branch");
                return Ok(branch.to_string());
            }
            Ok(resp) => {
                tracing::warn!(repository = %repo, branch, status = resp.status, "[BRANCH] No tree on branch");
            }
            Err(e) => {
                tracing::warn!(repository = %repo, branch, error = %e, "[BRANCH] Tree probe failed");
            }
        }
    }

    tracing::error!(repository = %repo, "[BRANCH] No candidate branch has a tree");
    Err(ExportError::TreeUnavailable {
        candidates: candidates.iter().map(|b| b.to_string()).collect(),
    })
}
