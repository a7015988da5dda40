//! Tree fetcher: recursive listing, media filtering, blob decoding.
//!
//! Blob requests run on a bounded pool; results are tagged with their listing
//! index and put back in listing order before they are returned, so the
//! output never depends on which request finished first.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::config::{ExportOptions, RepositoryHandle};
use crate::contract::{get_json, ApiRequest, RemoteClient};
use crate::records::FileRecord;

/// Blobs above this size still export, with a warning.
pub const LARGE_FILE_BYTES: u64 = 1024 * 1024;

/// Lowercase suffixes never exported: images, audio/video, archives,
/// office documents, fonts and compiled binaries.
pub const EXCLUDED_EXTENSIONS: &[&str] = &[
    // images
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "icns", "svg", "webp", "tif", "tiff", "psd", "heic",
    // audio / video
    "mp3", "wav", "ogg", "flac", "aac", "m4a", "mp4", "m4v", "mov", "avi", "mkv", "webm", "wmv",
    "flv",
    // archives
    "zip", "tar", "gz", "tgz", "bz2", "xz", "7z", "rar", "jar", "war",
    // documents
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt", "ods", "odp",
    // fonts and binaries
    "woff", "woff2", "ttf", "otf", "eot", "exe", "dll", "so", "dylib", "bin", "class", "o", "a",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Blob,
    Tree,
    /// Submodules and anything newer.
    #[serde(other)]
    Other,
}

/// One row of the recursive tree listing. Lives only for the fetch loop.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub size: u64,
}

#[derive(Debug, Deserialize)]
struct TreeListing {
    #[serde(default)]
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct BlobResponse {
    content: String,
    encoding: String,
    #[serde(default)]
    size: Option<u64>,
}

/// True when the path's extension, lowercased, is in [`EXCLUDED_EXTENSIONS`].
pub fn is_excluded(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| EXCLUDED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Entries worth fetching: blobs whose extension is not excluded, in listing order.
pub fn exportable_entries(entries: Vec<TreeEntry>) -> Vec<TreeEntry> {
    entries
        .into_iter()
        .filter(|entry| entry.kind == EntryKind::Blob)
        .filter(|entry| {
            let excluded = is_excluded(&entry.path);
            if excluded {
                tracing::debug!(path = %entry.path, "[TREE] Skipping excluded media file");
            }
            !excluded
        })
        .collect()
}

/// Why a blob's content could not be turned into text.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid base64 content")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("unsupported blob encoding {0:?}")]
    UnsupportedEncoding(String),
}

/// Decode blob content into text. Invalid UTF-8 is replaced, not rejected.
pub fn decode_content(content: &str, encoding: &str) -> Result<String, DecodeError> {
    match encoding {
        "base64" => {
            let compact: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
            let bytes = STANDARD.decode(compact.as_bytes())?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        "utf-8" | "utf8" => Ok(content.to_string()),
        other => Err(DecodeError::UnsupportedEncoding(other.to_string())),
    }
}

/// Every exportable file on `branch`, in listing order.
///
/// A failed listing yields no files; a failed blob skips only that file.
pub async fn fetch_files<C>(
    client: &C,
    repo: &RepositoryHandle,
    branch: &str,
    options: &ExportOptions,
) -> Vec<FileRecord>
where
    C: RemoteClient + ?Sized,
{
    let request = ApiRequest::new(format!("{}/git/trees/{}", repo.api_path(), branch))
        .query("recursive", 1);
    let Some(listing) = get_json::<_, TreeListing>(client, request).await else {
        tracing::error!(repository = %repo, branch, "[TREE] Recursive tree listing unavailable, exporting no files");
        return Vec::new();
    };
    if listing.truncated {
        tracing::warn!(repository = %repo, branch, "[TREE] Tree listing was truncated by the remote, some files are missing");
    }

    let listed = listing.tree.len();
    let entries = exportable_entries(listing.tree);
    tracing::info!(listed, exportable = entries.len(), "[TREE] Fetching blob contents");

    let mut fetched: Vec<(usize, Option<FileRecord>)> = stream::iter(entries.into_iter().enumerate())
        .map(|(idx, entry)| async move { (idx, fetch_blob(client, entry).await) })
        .buffer_unordered(options.workers())
        .collect()
        .await;
    fetched.sort_by_key(|(idx, _)| *idx);

    let files: Vec<FileRecord> = fetched.into_iter().filter_map(|(_, file)| file).collect();
    tracing::info!(count = files.len(), "[TREE] Completed file export");
    files
}

async fn fetch_blob<C>(client: &C, entry: TreeEntry) -> Option<FileRecord>
where
    C: RemoteClient + ?Sized,
{
    let Some(url) = entry.url.as_deref() else {
        tracing::warn!(path = %entry.path, "[TREE] Blob has no URL, skipping");
        return None;
    };
    let blob = get_json::<_, BlobResponse>(client, ApiRequest::new(url)).await;
    let Some(blob) = blob else {
        tracing::warn!(path = %entry.path, "[TREE] Failed to fetch blob, skipping file");
        return None;
    };

    let content = match decode_content(&blob.content, &blob.encoding) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(path = %entry.path, error = ?e, "[TREE] Failed to decode blob, skipping file");
            return None;
        }
    };

    let size_bytes = blob.size.unwrap_or(entry.size);
    if size_bytes > LARGE_FILE_BYTES {
        tracing::warn!(path = %entry.path, size = size_bytes, "[TREE] Large file exported in full");
    }
    tracing::debug!(path = %entry.path, size = size_bytes, "[TREE] Decoded file");

    Some(FileRecord {
        path: entry.path,
        content,
        size_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excluded_extensions_match_case_insensitively() {
        for path in ["logo.png", "docs/Logo.PNG", "a/b/clip.MoV", "release.tar.GZ", "manual.Pdf"] {
            assert!(is_excluded(path), "{path} should be excluded");
        }
    }

    #[test]
    fn source_and_extensionless_files_are_kept() {
        for path in ["main.go", "src/lib.rs", "Makefile", "LICENSE", ".gitignore", "png/notes.txt"] {
            assert!(!is_excluded(path), "{path} should be kept");
        }
    }

    #[test]
    fn only_non_media_blobs_survive_in_order() {
        let entry = |path: &str, kind| TreeEntry {
            path: path.to_string(),
            kind,
            url: Some(format!("https://api/blobs/{path}")),
            size: 1,
        };
        let kept = exportable_entries(vec![
            entry("src", EntryKind::Tree),
            entry("src/z.rs", EntryKind::Blob),
            entry("img/a.jpg", EntryKind::Blob),
            entry("vendor/lib", EntryKind::Other),
            entry("src/a.rs", EntryKind::Blob),
        ]);
        let paths: Vec<_> = kept.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, ["src/z.rs", "src/a.rs"]);
    }

    #[test]
    fn base64_with_line_breaks_decodes() {
        // "hello\nworld\n" wrapped the way the blob API wraps it
        let decoded = decode_content("aGVsbG8K\nd29ybGQK\n", "base64").unwrap();
        assert_eq!(decoded, "hello\nworld\n");
    }

    #[test]
    fn invalid_utf8_is_replaced_not_rejected() {
        let encoded = STANDARD.encode([b'o', b'k', 0xff, b'!']);
        let decoded = decode_content(&encoded, "base64").unwrap();
        assert_eq!(decoded, "ok\u{FFFD}!");
    }

    #[test]
    fn undecodable_blobs_report_the_cause() {
        assert!(matches!(
            decode_content("", "none"),
            Err(DecodeError::UnsupportedEncoding(ref enc)) if enc == "none"
        ));
        let err = decode_content("###", "base64").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidBase64(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn utf8_encoded_blobs_are_taken_verbatim() {
        assert_eq!(decode_content("plain\n", "utf-8").unwrap(), "plain\n");
    }

    #[test]
    fn submodule_entries_deserialize_as_other() {
        let entry: TreeEntry =
            serde_json::from_str(r#"{"path":"deps/x","type":"commit","sha":"abc"}"#).unwrap();
        assert_eq!(entry.kind, EntryKind::Other);
        assert!(entry.url.is_none());
    }
}
