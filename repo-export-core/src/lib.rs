#![doc = "repo-export-core: pipeline library for repo-export."]

//! This crate holds every stage of the repository export: the remote client
//! seam, quota guard, branch resolver, the four aggregators and the document
//! assembler. Argument parsing and file output live in the `repo-export` CLI.
//!
//! # Usage
//! Build a [`client::GitHubClient`], a [`config::RepositoryHandle`] and
//! [`config::ExportOptions`], then call [`export::export`].

pub mod assemble;
pub mod branch;
pub mod client;
pub mod config;
pub mod contract;
pub mod error;
pub mod export;
pub mod issues;
pub mod projects;
pub mod pulls;
pub mod rate_limit;
pub mod records;
pub mod tree;

pub use assemble::ExportDocument;
pub use error::ExportError;
pub use export::export;
