//! Records produced by the aggregators.
//!
//! Every record carries what it needs to render itself; nothing here refers
//! to another record.

use serde::Deserialize;
use std::fmt;

/// Repository-level facts shown at the top of the export.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepositoryMetadata {
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub default_branch: String,
}

/// One decoded file from the tree listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: String,
    pub content: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemState {
    Open,
    Closed,
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemState::Open => f.write_str("open"),
            ItemState::Closed => f.write_str("closed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRecord {
    pub author: String,
    pub created_at: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRecord {
    pub number: u64,
    pub title: String,
    pub state: ItemState,
    pub created_at: String,
    pub body: Option<String>,
    pub comments: Vec<CommentRecord>,
}

/// Pull requests never carry comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRecord {
    pub number: u64,
    pub title: String,
    pub state: ItemState,
    pub created_at: String,
    pub body: Option<String>,
}

/// What a classic project card points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkedContentKind {
    Issue,
    PullRequest,
}

impl fmt::Display for LinkedContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkedContentKind::Issue => f.write_str("Issue"),
            LinkedContentKind::PullRequest => f.write_str("PullRequest"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardRecord {
    Note { text: String },
    LinkedContent { kind: LinkedContentKind, title: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRecord {
    pub name: String,
    pub cards: Vec<CardRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectItemRecord {
    pub title: String,
    pub content_type: String,
}

/// A project board, tagged by schema when it is fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectRecord {
    Classic {
        name: String,
        state: String,
        created_at: String,
        body: Option<String>,
        columns: Vec<ColumnRecord>,
    },
    NextGen {
        title: String,
        number: u64,
        created_at: String,
        body: Option<String>,
        items: Vec<ProjectItemRecord>,
    },
}

/// Stand-ins for the Projects section when there is nothing to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectSentinel {
    /// Both schemas answered with a non-success status.
    NoneOrAccessDenied,
    /// Both schemas answered, with zero projects between them.
    NoneFound,
}

impl ProjectSentinel {
    pub fn message(self) -> &'static str {
        match self {
            ProjectSentinel::NoneOrAccessDenied => "No projects found or access denied",
            ProjectSentinel::NoneFound => "No projects found",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectsOutcome {
    Projects(Vec<ProjectRecord>),
    Sentinel(ProjectSentinel),
}
