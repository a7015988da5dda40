//! Issue aggregator.
//!
//! Pages through `/issues?state=all` until a page comes back empty or fails,
//! then fetches the comments of every issue that reports any. The remote
//! lists pull requests on this endpoint too; they are exported as issues.
//!
//! Known limits, kept on purpose:
//! - a failed page ends pagination silently, later pages are not tried;
//! - only the first page of each comment thread is fetched.

use futures::stream::{self, StreamExt};
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

use crate::config::{ExportOptions, RepositoryHandle};
use crate::contract::{get_json, ApiRequest, RemoteClient};
use crate::records::{CommentRecord, IssueRecord, ItemState};

/// Author shown for comments whose account no longer exists.
pub const GHOST_AUTHOR: &str = "ghost";

#[derive(Debug, Deserialize)]
struct IssuePayload {
    number: u64,
    title: String,
    state: ItemState,
    created_at: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    comments: u64,
    #[serde(default)]
    comments_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    login: String,
}

#[derive(Debug, Deserialize)]
struct CommentPayload {
    #[serde(default)]
    user: Option<UserPayload>,
    created_at: String,
    #[serde(default)]
    body: Option<String>,
}

impl From<CommentPayload> for CommentRecord {
    fn from(c: CommentPayload) -> Self {
        CommentRecord {
            author: c
                .user
                .map(|u| u.login)
                .unwrap_or_else(|| GHOST_AUTHOR.to_string()),
            created_at: c.created_at,
            body: c.body.unwrap_or_default(),
        }
    }
}

/// Page number of the `rel="last"` link, used only to estimate progress.
pub fn last_page_from_link(link: &str) -> Option<u32> {
    static LAST_LINK: OnceLock<Option<Regex>> = OnceLock::new();
    let re = LAST_LINK
        .get_or_init(|| Regex::new(r#"[?&]page=(\d+)[^>]*>;\s*rel="last""#).ok())
        .as_ref()?;
    re.captures(link)?.get(1)?.as_str().parse().ok()
}

/// All issues of the repository with their comments, in remote order.
pub async fn fetch_issues<C>(
    client: &C,
    repo: &RepositoryHandle,
    options: &ExportOptions,
) -> Vec<IssueRecord>
where
    C: RemoteClient + ?Sized,
{
    let mut issues: Vec<IssueRecord> = Vec::new();
    let mut estimated_pages: Option<u32> = None;
    let mut page: u32 = 1;

    'fetch_pages: loop {
        let request = ApiRequest::new(format!("{}/issues", repo.api_path()))
            .query("state", "all")
            .query("page", page)
            .query("per_page", options.issues_per_page);

        let resp = match client.request(request).await {
            Ok(resp) if resp.is_success() => resp,
            Ok(resp) => {
                tracing::warn!(page, status = resp.status, "[ISSUES] Page request failed, stopping pagination");
                break 'fetch_pages;
            }
            Err(e) => {
                tracing::warn!(page, error = %e, "[ISSUES] Page request failed, stopping pagination");
                break 'fetch_pages;
            }
        };

        if page == 1 {
            estimated_pages = resp.header("link").and_then(last_page_from_link);
        }

        let batch: Vec<IssuePayload> = match resp.json() {
            Ok(batch) => batch,
            Err(e) => {
                tracing::warn!(page, error = ?e, "[ISSUES] Failed to parse issues page, stopping pagination");
                break 'fetch_pages;
            }
        };
        if batch.is_empty() {
            break 'fetch_pages;
        }

        issues.extend(with_comments(client, repo, batch, options).await);
        tracing::info!(
            page,
            fetched_so_far = issues.len(),
            estimated_pages = ?estimated_pages,
            "[ISSUES] Fetched issues page"
        );
        page += 1;
    }

    tracing::info!(count = issues.len(), "[ISSUES] Completed issue export");
    issues
}

/// Attach comments to one page of issues, keeping the page order.
async fn with_comments<C>(
    client: &C,
    repo: &RepositoryHandle,
    batch: Vec<IssuePayload>,
    options: &ExportOptions,
) -> Vec<IssueRecord>
where
    C: RemoteClient + ?Sized,
{
    let mut records: Vec<(usize, IssueRecord)> = stream::iter(batch.into_iter().enumerate())
        .map(|(idx, issue)| async move {
            let comments = if issue.comments > 0 {
                fetch_comments(client, repo, &issue).await
            } else {
                Vec::new()
            };
            let record = IssueRecord {
                number: issue.number,
                title: issue.title,
                state: issue.state,
                created_at: issue.created_at,
                body: issue.body,
                comments,
            };
            (idx, record)
        })
        .buffer_unordered(options.workers())
        .collect()
        .await;
    records.sort_by_key(|(idx, _)| *idx);
    records.into_iter().map(|(_, record)| record).collect()
}

async fn fetch_comments<C>(
    client: &C,
    repo: &RepositoryHandle,
    issue: &IssuePayload,
) -> Vec<CommentRecord>
where
    C: RemoteClient + ?Sized,
{
    let path = issue
        .comments_url
        .clone()
        .unwrap_or_else(|| format!("{}/issues/{}/comments", repo.api_path(), issue.number));

    match get_json::<_, Vec<CommentPayload>>(client, ApiRequest::new(path)).await {
        Some(comments) => {
            if (comments.len() as u64) < issue.comments {
                tracing::debug!(
                    issue = issue.number,
                    reported = issue.comments,
                    fetched = comments.len(),
                    "[ISSUES] Comment thread longer than one page, exporting first page only"
                );
            }
            comments.into_iter().map(CommentRecord::from).collect()
        }
        None => {
            tracing::warn!(issue = issue.number, "[ISSUES] Failed to fetch comments, exporting issue without them");
            Vec::new()
        }
    }
}
