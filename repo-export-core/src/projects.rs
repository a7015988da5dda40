//! Project aggregator.
//!
//! Classic boards (project → columns → cards) and next-generation projects
//! (organisation project → items) are fetched independently; neither result
//! affects whether the other is attempted. Each record is tagged with its
//! schema at fetch time.
//!
//! Only the top-level listing decides whether a schema "failed". A broken
//! column, card or item listing inside a project only drops that part.

use serde::Deserialize;

use crate::config::RepositoryHandle;
use crate::contract::{get_json, ApiRequest, RemoteClient, ACCEPT_CLASSIC_PROJECTS};
use crate::records::{
    CardRecord, ColumnRecord, LinkedContentKind, ProjectItemRecord, ProjectRecord,
    ProjectSentinel, ProjectsOutcome,
};

/// Title used for next-generation items whose content has no title.
pub const UNTITLED_ITEM: &str = "Untitled";

#[derive(Debug, Deserialize)]
struct ClassicProjectPayload {
    id: u64,
    name: String,
    #[serde(default)]
    body: Option<String>,
    state: String,
    created_at: String,
    #[serde(default)]
    columns_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ColumnPayload {
    id: u64,
    name: String,
    #[serde(default)]
    cards_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CardPayload {
    #[serde(default)]
    note: Option<String>,
    #[serde(default)]
    content_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LinkedContentPayload {
    title: String,
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct NextGenProjectPayload {
    number: u64,
    title: String,
    created_at: String,
    #[serde(default)]
    short_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ItemContentPayload {
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NextGenItemPayload {
    content_type: String,
    #[serde(default)]
    content: Option<ItemContentPayload>,
}

/// Outcome of one schema's top-level listing.
#[derive(Debug)]
enum Listing {
    Failed,
    Listed(Vec<ProjectRecord>),
}

/// Projects of both schemas, classic first, or a sentinel when there is
/// nothing to show.
pub async fn fetch_projects<C>(client: &C, repo: &RepositoryHandle) -> ProjectsOutcome
where
    C: RemoteClient + ?Sized,
{
    let classic = fetch_classic_projects(client, repo).await;
    let next_gen = fetch_next_gen_projects(client, repo).await;
    combine(classic, next_gen)
}

fn combine(classic: Listing, next_gen: Listing) -> ProjectsOutcome {
    match (classic, next_gen) {
        (Listing::Failed, Listing::Failed) => {
            tracing::warn!("[PROJECTS] Neither project schema is accessible");
            ProjectsOutcome::Sentinel(ProjectSentinel::NoneOrAccessDenied)
        }
        (Listing::Listed(c), Listing::Listed(n)) if c.is_empty() && n.is_empty() => {
            tracing::info!("[PROJECTS] Repository has no projects");
            ProjectsOutcome::Sentinel(ProjectSentinel::NoneFound)
        }
        (classic, next_gen) => {
            let mut projects = Vec::new();
            for listing in [classic, next_gen] {
                if let Listing::Listed(records) = listing {
                    projects.extend(records);
                }
            }
            tracing::info!(count = projects.len(), "[PROJECTS] Completed project export");
            ProjectsOutcome::Projects(projects)
        }
    }
}

async fn fetch_classic_projects<C>(client: &C, repo: &RepositoryHandle) -> Listing
where
    C: RemoteClient + ?Sized,
{
    let request =
        ApiRequest::new(format!("{}/projects", repo.api_path())).accept(ACCEPT_CLASSIC_PROJECTS);
    let Some(projects) = get_json::<_, Vec<ClassicProjectPayload>>(client, request).await else {
        tracing::warn!(repository = %repo, "[PROJECTS] Classic project listing unavailable");
        return Listing::Failed;
    };

    let mut records = Vec::with_capacity(projects.len());
    for project in projects {
        let columns = fetch_columns(client, &project).await;
        records.push(ProjectRecord::Classic {
            name: project.name,
            state: project.state,
            created_at: project.created_at,
            body: project.body,
            columns,
        });
    }
    tracing::info!(count = records.len(), "[PROJECTS] Fetched classic projects");
    Listing::Listed(records)
}

async fn fetch_columns<C>(client: &C, project: &ClassicProjectPayload) -> Vec<ColumnRecord>
where
    C: RemoteClient + ?Sized,
{
    let path = project
        .columns_url
        .clone()
        .unwrap_or_else(|| format!("/projects/{}/columns", project.id));
    let request = ApiRequest::new(path).accept(ACCEPT_CLASSIC_PROJECTS);
    let Some(columns) = get_json::<_, Vec<ColumnPayload>>(client, request).await else {
        tracing::warn!(project = %project.name, "[PROJECTS] Failed to list columns, exporting project without them");
        return Vec::new();
    };

    let mut records = Vec::with_capacity(columns.len());
    for column in columns {
        let cards = fetch_cards(client, &column).await;
        records.push(ColumnRecord {
            name: column.name,
            cards,
        });
    }
    records
}

async fn fetch_cards<C>(client: &C, column: &ColumnPayload) -> Vec<CardRecord>
where
    C: RemoteClient + ?Sized,
{
    let path = column
        .cards_url
        .clone()
        .unwrap_or_else(|| format!("/projects/columns/{}/cards", column.id));
    let request = ApiRequest::new(path).accept(ACCEPT_CLASSIC_PROJECTS);
    let Some(cards) = get_json::<_, Vec<CardPayload>>(client, request).await else {
        tracing::warn!(column = %column.name, "[PROJECTS] Failed to list cards, exporting column without them");
        return Vec::new();
    };

    let mut records = Vec::with_capacity(cards.len());
    for card in cards {
        if let Some(text) = card.note {
            records.push(CardRecord::Note { text });
        } else if let Some(url) = card.content_url {
            match get_json::<_, LinkedContentPayload>(client, ApiRequest::new(url.as_str())).await {
                Some(content) => {
                    let kind = if content.pull_request.is_some() {
                        LinkedContentKind::PullRequest
                    } else {
                        LinkedContentKind::Issue
                    };
                    records.push(CardRecord::LinkedContent {
                        kind,
                        title: content.title,
                    });
                }
                None => {
                    tracing::warn!(content_url = %url, "[PROJECTS] Failed to fetch card content, skipping card");
                }
            }
        }
    }
    records
}

async fn fetch_next_gen_projects<C>(client: &C, repo: &RepositoryHandle) -> Listing
where
    C: RemoteClient + ?Sized,
{
    let request = ApiRequest::new(format!("/orgs/{}/projectsV2", repo.owner));
    let Some(projects) = get_json::<_, Vec<NextGenProjectPayload>>(client, request).await else {
        tracing::warn!(owner = %repo.owner, "[PROJECTS] Next-generation project listing unavailable");
        return Listing::Failed;
    };

    let mut records = Vec::with_capacity(projects.len());
    for project in projects {
        let items = fetch_items(client, repo, &project).await;
        records.push(ProjectRecord::NextGen {
            title: project.title,
            number: project.number,
            created_at: project.created_at,
            body: project.short_description,
            items,
        });
    }
    tracing::info!(count = records.len(), "[PROJECTS] Fetched next-generation projects");
    Listing::Listed(records)
}

async fn fetch_items<C>(
    client: &C,
    repo: &RepositoryHandle,
    project: &NextGenProjectPayload,
) -> Vec<ProjectItemRecord>
where
    C: RemoteClient + ?Sized,
{
    let request = ApiRequest::new(format!(
        "/orgs/{}/projectsV2/{}/items",
        repo.owner, project.number
    ));
    let Some(items) = get_json::<_, Vec<NextGenItemPayload>>(client, request).await else {
        tracing::warn!(project = project.number, "[PROJECTS] Failed to list items, exporting project without them");
        return Vec::new();
    };

    items
        .into_iter()
        .map(|item| ProjectItemRecord {
            title: item
                .content
                .and_then(|c| c.title)
                .unwrap_or_else(|| UNTITLED_ITEM.to_string()),
            content_type: item.content_type,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classic(name: &str) -> ProjectRecord {
        ProjectRecord::Classic {
            name: name.to_string(),
            state: "open".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            body: None,
            columns: Vec::new(),
        }
    }

    #[test]
    fn both_failed_is_access_denied() {
        assert_eq!(
            combine(Listing::Failed, Listing::Failed),
            ProjectsOutcome::Sentinel(ProjectSentinel::NoneOrAccessDenied)
        );
    }

    #[test]
    fn both_empty_is_none_found() {
        assert_eq!(
            combine(Listing::Listed(vec![]), Listing::Listed(vec![])),
            ProjectsOutcome::Sentinel(ProjectSentinel::NoneFound)
        );
    }

    #[test]
    fn one_failed_one_empty_is_an_empty_list() {
        assert_eq!(
            combine(Listing::Failed, Listing::Listed(vec![])),
            ProjectsOutcome::Projects(vec![])
        );
        assert_eq!(
            combine(Listing::Listed(vec![]), Listing::Failed),
            ProjectsOutcome::Projects(vec![])
        );
    }

    #[test]
    fn surviving_schema_is_kept_when_the_other_fails() {
        assert_eq!(
            combine(Listing::Listed(vec![classic("Roadmap")]), Listing::Failed),
            ProjectsOutcome::Projects(vec![classic("Roadmap")])
        );
    }
}
