/// `load_config` module: turns an optional YAML settings file plus the environment into the
/// typed [`ClientConfig`] and [`ExportOptions`] the core pipeline consumes.
///
/// This is the only place where untrusted YAML is parsed.
///
/// # Responsibilities
/// - Parse the settings file; every key is optional and falls back to the core defaults
/// - Read the API token from `GITHUB_TOKEN` (a `.env` file is loaded by `main`)
/// - Fail with a clear diagnostic when the file is unreadable, malformed, or the token is missing
///
/// # Accepted keys
/// `api_base_url`, `user_agent`, `request_timeout_secs`, `concurrency`, `deadline_secs`
/// (`0` disables the deadline) and `check_quota`.
use anyhow::{anyhow, Result};
use repo_export_core::config::{ClientConfig, ExportOptions};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};

/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Raw YAML shape. Unknown keys are rejected so typos surface early.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub api_base_url: Option<String>,
    pub user_agent: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub concurrency: Option<usize>,
    pub deadline_secs: Option<u64>,
    pub check_quota: Option<bool>,
}

#[derive(Debug)]
pub struct CliConfig {
    pub client: ClientConfig,
    pub options: ExportOptions,
}

/// Loads settings from `path` (or defaults when `None`) and injects the token from the environment.
pub fn load_config<P: AsRef<Path>>(path: Option<P>) -> Result<CliConfig> {
    let settings = match path {
        Some(path) => read_settings(path.as_ref())?,
        None => {
            info!("No settings file given, using defaults");
            Settings::default()
        }
    };

    let token = match env::var(TOKEN_ENV) {
        Ok(token) if !token.trim().is_empty() => token,
        _ => {
            error!(env = TOKEN_ENV, "API token missing in environment");
            return Err(anyhow!("{TOKEN_ENV} must be set to an API token"));
        }
    };

    Ok(apply(settings, token))
}

fn read_settings(path: &Path) -> Result<Settings> {
    info!(config_path = ?path, "Loading settings from file");

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to read settings file");
            return Err(anyhow!("Failed to read settings file {:?}: {}", path, e));
        }
    };

    // An empty file is valid and means "all defaults".
    if content.trim().is_empty() {
        return Ok(Settings::default());
    }

    match serde_yaml::from_str(&content) {
        Ok(settings) => {
            info!(config_path = ?path, "Parsed settings YAML successfully");
            Ok(settings)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to parse settings YAML");
            Err(anyhow!("Failed to parse settings YAML: {e}"))
        }
    }
}

fn apply(settings: Settings, token: String) -> CliConfig {
    let mut client = ClientConfig::new(token);
    if let Some(base_url) = settings.api_base_url {
        client.base_url = base_url;
    }
    if let Some(user_agent) = settings.user_agent {
        client.user_agent = user_agent;
    }
    if let Some(secs) = settings.request_timeout_secs {
        client.request_timeout = Duration::from_secs(secs);
    }

    let mut options = ExportOptions::default();
    if let Some(concurrency) = settings.concurrency {
        options.concurrency = concurrency;
    }
    if let Some(secs) = settings.deadline_secs {
        options.deadline = (secs > 0).then(|| Duration::from_secs(secs));
    }
    if let Some(check_quota) = settings.check_quota {
        options.check_quota = check_quota;
    }

    CliConfig { client, options }
}
