//! High-level pipeline: quota → metadata → branch → files → issues → pull
//! requests → projects → document.
//!
//! # Responsibilities
//! - Runs every stage against one shared [`RemoteClient`] and one immutable
//!   [`ExportOptions`]; no stage reads or writes ambient state
//! - Unwinds only on the fatal class: metadata unavailable, no tree on any
//!   candidate branch, exhausted quota, or the overall deadline passing
//! - Every other stage failure has already been absorbed by the stage itself
//!   and shows up as omitted items or a sentinel
//!
//! # Navigation
//! - Main entrypoint: [`export`]
//! - Output: [`ExportDocument`]

use tracing::{error, info, Instrument};
use uuid::Uuid;

use crate::assemble::{assemble, ExportDocument};
use crate::branch::resolve_branch;
use crate::config::{ExportOptions, RepositoryHandle};
use crate::contract::{ApiRequest, RemoteClient};
use crate::error::ExportError;
use crate::issues::fetch_issues;
use crate::projects::fetch_projects;
use crate::pulls::fetch_pull_requests;
use crate::rate_limit::check_quota;
use crate::records::{ProjectsOutcome, RepositoryMetadata};
use crate::tree::fetch_files;

/// Export `repo` into one document, bounded by `options.deadline`.
pub async fn export<C>(
    client: &C,
    repo: &RepositoryHandle,
    options: &ExportOptions,
) -> Result<ExportDocument, ExportError>
where
    C: RemoteClient + ?Sized,
{
    let export_id = Uuid::new_v4();
    let span = tracing::info_span!("export", %export_id, repository = %repo);
    let pipeline = run_pipeline(client, repo, options).instrument(span);

    match options.deadline {
        Some(after) => tokio::time::timeout(after, pipeline).await.map_err(|_| {
            error!(%export_id, ?after, "[EXPORT][ERROR] Deadline exceeded");
            ExportError::DeadlineExceeded { after }
        })?,
        None => pipeline.await,
    }
}

async fn run_pipeline<C>(
    client: &C,
    repo: &RepositoryHandle,
    options: &ExportOptions,
) -> Result<ExportDocument, ExportError>
where
    C: RemoteClient + ?Sized,
{
    info!("[EXPORT] Starting export pipeline");
    options.trace_loaded();

    if options.check_quota {
        check_quota(client).await?;
    }

    let metadata = fetch_metadata(client, repo).await?;
    info!(default_branch = %metadata.default_branch, "[EXPORT] Fetched repository metadata");

    let branch = resolve_branch(client, repo).await?;

    let files = fetch_files(client, repo, &branch, options).await;
    let issues = fetch_issues(client, repo, options).await;
    let pull_requests = fetch_pull_requests(client, repo).await;
    let projects = fetch_projects(client, repo).await;

    info!(
        files = files.len(),
        issues = issues.len(),
        pull_requests = pull_requests.len(),
        projects = match &projects {
            ProjectsOutcome::Projects(p) => p.len(),
            ProjectsOutcome::Sentinel(_) => 0,
        },
        "[EXPORT] All stages finished, assembling document"
    );

    Ok(assemble(metadata, files, issues, pull_requests, projects))
}

/// The only stage whose failure is always fatal.
pub async fn fetch_metadata<C>(
    client: &C,
    repo: &RepositoryHandle,
) -> Result<RepositoryMetadata, ExportError>
where
    C: RemoteClient + ?Sized,
{
    let resp = client
        .request(ApiRequest::new(repo.api_path()))
        .await
        .map_err(|e| {
            error!(repository = %repo, error = %e, "[EXPORT][ERROR] Metadata request failed");
            ExportError::from(e)
        })?;

    if !resp.is_success() {
        error!(repository = %repo, status = resp.status, "[EXPORT][ERROR] Metadata unavailable");
        return Err(ExportError::MetadataUnavailable {
            status: Some(resp.status),
        });
    }

    resp.json::<RepositoryMetadata>().map_err(|e| {
        error!(repository = %repo, error = ?e, "[EXPORT][ERROR] Failed to parse repository metadata");
        ExportError::MetadataUnavailable {
            status: Some(resp.status),
        }
    })
}
