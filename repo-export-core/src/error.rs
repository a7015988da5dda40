//! Failures that abort an export.
//!
//! Only the fatal class and quota exhaustion live here. Per-item failures are
//! absorbed inside each stage and never become an `ExportError`.

use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

use crate::contract::TransportError;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("repository metadata unavailable (status {status:?})")]
    MetadataUnavailable { status: Option<u16> },

    #[error("no tree found on any of the branches {candidates:?}")]
    TreeUnavailable { candidates: Vec<String> },

    #[error("API quota exhausted. Resets at {reset_at}")]
    QuotaExhausted { reset_at: DateTime<Utc> },

    #[error("export did not finish within {after:?}")]
    DeadlineExceeded { after: Duration },

    #[error("invalid repository identifier {0:?}, expected owner/name")]
    InvalidRepository(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub type Result<T, E = ExportError> = std::result::Result<T, E>;
