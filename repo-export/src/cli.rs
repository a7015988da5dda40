///
/// This module implements the CLI interface for repo-export: command parsing,
/// argument validation and the async entrypoint.
///
/// All pipeline logic (remote access, aggregation, rendering) lives in the [`repo-export-core`] crate.
/// This module is strictly glue: settings, credential, client construction and output.
///
/// ## How To Use
/// - For command-line users: use the installed `repo-export` binary with `--help`.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// [`repo-export-core`]: ../../repo-export-core/
/// [`Cli`]: struct.Cli.html
/// [`run`]: fn.run.html
use crate::load_config::load_config;
use crate::output::OutputTarget;
use anyhow::Result;
use clap::{Parser, Subcommand};
use repo_export_core::client::GitHubClient;
use repo_export_core::config::RepositoryHandle;
use repo_export_core::export;
use std::path::PathBuf;

/// CLI for repo-export: dump a repository's files, issues, pull requests and projects into one text file.
#[derive(Parser)]
#[clap(
    name = "repo-export",
    version,
    about = "Export a hosted repository's files, issues, pull requests and projects into one text document"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export one repository
    Export {
        /// Repository as owner/name
        #[clap(long)]
        repo: String,
        /// Optional YAML settings file
        #[clap(long)]
        config: Option<PathBuf>,
        /// Output file, or `-` for stdout. Defaults to a timestamped file in the current directory
        #[clap(long)]
        output: Option<PathBuf>,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Export {
            repo,
            config,
            output,
        } => {
            let repo: RepositoryHandle = repo.parse()?;
            let config = load_config(config)?;
            tracing::info!(command = "export", repository = %repo, "Starting export");

            let client = GitHubClient::new(&config.client)
                .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;

            let document = match export(&client, &repo, &config.options).await {
                Ok(document) => document,
                Err(e) => {
                    tracing::error!(command = "export", error = %e, "Export failed");
                    return Err(anyhow::Error::new(e));
                }
            };

            let target = OutputTarget::resolve(output.as_deref(), &repo, chrono::Local::now());
            target.write(&document.render())?;

            match target {
                OutputTarget::Stdout => eprintln!("Repository exported to: {target}"),
                OutputTarget::File(_) => println!("Repository exported to: {target}"),
            }
            tracing::info!(command = "export", output = %target, "Export complete");
            Ok(())
        }
    }
}
