//! Export assembler: fixed section order, plain-text rendering.
//!
//! Sections are rendered independently and joined with newlines:
//! repository metadata, files, issues, pull requests, projects.

use std::fmt;

use crate::records::{
    CardRecord, FileRecord, IssueRecord, ProjectRecord, ProjectsOutcome, PullRequestRecord,
    RepositoryMetadata,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    RepositoryMetadata(RepositoryMetadata),
    Files(Vec<FileRecord>),
    Issues(Vec<IssueRecord>),
    PullRequests(Vec<PullRequestRecord>),
    Projects(ProjectsOutcome),
}

/// The finished export. Immutable once assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    sections: Vec<Section>,
}

/// Concatenate the stage outputs in the fixed order. No validation, no
/// deduplication.
pub fn assemble(
    metadata: RepositoryMetadata,
    files: Vec<FileRecord>,
    issues: Vec<IssueRecord>,
    pull_requests: Vec<PullRequestRecord>,
    projects: ProjectsOutcome,
) -> ExportDocument {
    ExportDocument {
        sections: vec![
            Section::RepositoryMetadata(metadata),
            Section::Files(files),
            Section::Issues(issues),
            Section::PullRequests(pull_requests),
            Section::Projects(projects),
        ],
    }
}

impl ExportDocument {
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn metadata(&self) -> Option<&RepositoryMetadata> {
        self.sections.iter().find_map(|s| match s {
            Section::RepositoryMetadata(m) => Some(m),
            _ => None,
        })
    }

    pub fn files(&self) -> &[FileRecord] {
        self.sections
            .iter()
            .find_map(|s| match s {
                Section::Files(f) => Some(f.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    pub fn issues(&self) -> &[IssueRecord] {
        self.sections
            .iter()
            .find_map(|s| match s {
                Section::Issues(i) => Some(i.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    pub fn pull_requests(&self) -> &[PullRequestRecord] {
        self.sections
            .iter()
            .find_map(|s| match s {
                Section::PullRequests(p) => Some(p.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    pub fn projects(&self) -> Option<&ProjectsOutcome> {
        self.sections.iter().find_map(|s| match s {
            Section::Projects(p) => Some(p),
            _ => None,
        })
    }

    /// The whole document as one string.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ExportDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, section) in self.sections.iter().enumerate() {
            if idx > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{section}")?;
        }
        Ok(())
    }
}

fn join_blocks<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::RepositoryMetadata(m) => {
                writeln!(f, "=== Repository: {} ===", m.full_name)?;
                writeln!(f, "Description: {}", m.description.as_deref().unwrap_or(""))?;
                writeln!(f, "Created: {}", m.created_at)?;
                writeln!(f, "Last Updated: {}", m.updated_at)?;
                write!(f, "Default Branch: {}", m.default_branch)
            }
            Section::Files(files) => write!(f, "\n=== Files ===\n{}", join_blocks(files)),
            Section::Issues(issues) => write!(f, "\n=== Issues ===\n{}", join_blocks(issues)),
            Section::PullRequests(prs) => {
                write!(f, "\n=== Pull Requests ===\n{}", join_blocks(prs))
            }
            Section::Projects(ProjectsOutcome::Projects(projects)) => {
                write!(f, "\n=== Projects ===\n{}", join_blocks(projects))
            }
            Section::Projects(ProjectsOutcome::Sentinel(sentinel)) => {
                write!(f, "\n=== Projects ===\n{}", sentinel.message())
            }
        }
    }
}

impl fmt::Display for FileRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\n=== File: {} ===\n{}", self.path, self.content)
    }
}

impl fmt::Display for IssueRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n=== Issue #{}: {} ===", self.number, self.title)?;
        writeln!(f, "State: {}", self.state)?;
        writeln!(f, "Created: {}", self.created_at)?;
        writeln!(f, "Description:\n{}", self.body.as_deref().unwrap_or(""))?;
        for comment in &self.comments {
            writeln!(f, "\nComment by {} on {}:", comment.author, comment.created_at)?;
            writeln!(f, "{}", comment.body)?;
        }
        Ok(())
    }
}

impl fmt::Display for PullRequestRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n=== Pull Request #{}: {} ===", self.number, self.title)?;
        writeln!(f, "State: {}", self.state)?;
        writeln!(f, "Created: {}", self.created_at)?;
        writeln!(f, "Description:\n{}", self.body.as_deref().unwrap_or(""))
    }
}

impl fmt::Display for ProjectRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectRecord::Classic {
                name,
                state,
                created_at,
                body,
                columns,
            } => {
                writeln!(f, "\n=== Project: {name} ===")?;
                writeln!(f, "State: {state}")?;
                writeln!(f, "Created: {created_at}")?;
                writeln!(f, "Description:\n{}", body.as_deref().unwrap_or(""))?;
                for column in columns {
                    writeln!(f, "\nColumn: {}", column.name)?;
                    for card in &column.cards {
                        match card {
                            CardRecord::Note { text } => writeln!(f, "- Note: {text}")?,
                            CardRecord::LinkedContent { kind, title } => {
                                writeln!(f, "- {kind}: {title}")?
                            }
                        }
                    }
                }
                Ok(())
            }
            ProjectRecord::NextGen {
                title,
                number,
                created_at,
                body,
                items,
            } => {
                writeln!(f, "\n=== Project #{number}: {title} ===")?;
                writeln!(f, "Created: {created_at}")?;
                writeln!(f, "Description:\n{}", body.as_deref().unwrap_or(""))?;
                if !items.is_empty() {
                    writeln!(f, "\nItems:")?;
                }
                for item in items {
                    writeln!(f, "- [{}] {}", item.content_type, item.title)?;
                }
                Ok(())
            }
        }
    }
}
