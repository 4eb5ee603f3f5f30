//! Configuration resolution for the CLI.
//!
//! Resolves reefwatch.toml in priority order:
//! 1. `--config <path>` flag (explicit override)
//! 2. `{cwd}/.reefwatch/reefwatch.toml` (workspace config)
//! 3. `~/.config/reefwatch/reefwatch.toml` (global default)
//!
//! If the global default doesn't exist, it is generated automatically.

use anyhow::{Context, Result};
use client::{Client, ReefClient};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// Default config template generated when no config exists.
pub const DEFAULT_CONFIG: &str = r#"[server]
base_url = "http://localhost:8000"
connect_timeout_secs = 10

[predict]
# model = "llama3.1"
"#;

/// Workspace config location, relative to the working directory.
const WORKSPACE_CONFIG: &str = ".reefwatch/reefwatch.toml";

/// Resolved CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Prediction service connection.
    pub server: ServerConfig,
    /// Defaults applied to prediction requests.
    pub predict: PredictDefaults,
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Base URL the `/predict`, `/chat` and `/init-chat` paths resolve
    /// against.
    pub base_url: String,
    /// Connect timeout. Streams themselves have no deadline.
    pub connect_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".into(),
            connect_timeout_secs: 10,
        }
    }
}

/// `[predict]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PredictDefaults {
    /// Model forwarded with every prediction unless `--model` is given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl Config {
    /// Parse a config from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid reefwatch config")
    }

    /// Load a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Render the config as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).context("failed to serialize config")
    }

    /// Build the service client described by `[server]`.
    pub fn client(&self) -> Result<ReefClient> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(self.server.connect_timeout_secs))
            .build()
            .context("failed to build http client")?;
        ReefClient::new(http, &self.server.base_url)
            .with_context(|| format!("invalid base url {}", self.server.base_url))
    }
}

/// Resolve the config file path following the priority chain, generating
/// the global default if nothing exists yet.
pub fn resolve_config_path(config_flag: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = config_flag {
        return Ok(path.to_path_buf());
    }

    let workspace_path = PathBuf::from(WORKSPACE_CONFIG);
    if workspace_path.exists() {
        return Ok(workspace_path);
    }

    let global_path = global_config_path();
    if !global_path.exists() {
        generate_default_config(&global_path)?;
        tracing::info!("generated default config at {}", global_path.display());
    }
    Ok(global_path)
}

/// Path to the global default config.
pub fn global_config_path() -> PathBuf {
    config_dir().join("reefwatch.toml")
}

/// The global reefwatch config directory.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("reefwatch")
}

/// Write the default reefwatch.toml at the given path.
pub fn generate_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    std::fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write default config to {}", path.display()))?;
    Ok(())
}
