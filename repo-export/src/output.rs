//! Where the rendered document goes: a timestamped file by default, an explicit path, or stdout.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use repo_export_core::config::RepositoryHandle;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Destination chosen from `--output`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    /// `-` means stdout; no value means a timestamped file in the current directory.
    pub fn resolve(output: Option<&Path>, repo: &RepositoryHandle, now: DateTime<Local>) -> Self {
        match output {
            Some(path) if path.as_os_str() == "-" => OutputTarget::Stdout,
            Some(path) => OutputTarget::File(path.to_path_buf()),
            None => OutputTarget::File(PathBuf::from(default_file_name(repo, now))),
        }
    }

    pub fn write(&self, document: &str) -> Result<()> {
        match self {
            OutputTarget::Stdout => {
                let mut stdout = std::io::stdout().lock();
                stdout
                    .write_all(document.as_bytes())
                    .context("Failed to write document to stdout")?;
                stdout.flush().context("Failed to flush stdout")
            }
            OutputTarget::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("Failed to create directory {parent:?}"))?;
                }
                fs::write(path, document)
                    .with_context(|| format!("Failed to write document to {path:?}"))?;
                tracing::info!(path = ?path, bytes = document.len(), "Document written");
                Ok(())
            }
        }
    }
}

impl std::fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputTarget::Stdout => write!(f, "<stdout>"),
            OutputTarget::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// `{owner}_{name}_export_{YYYYmmdd_HHMMSS}.txt`
pub fn default_file_name(repo: &RepositoryHandle, now: DateTime<Local>) -> String {
    format!(
        "{}_{}_export_{}.txt",
        repo.owner,
        repo.name,
        now.format("%Y%m%d_%H%M%S")
    )
}
