//! CLI argument parsing and command dispatch.

use crate::config::{Config, resolve_config_path};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

pub mod chat;
pub mod config;
pub mod predict;

/// Coral bleaching risk predictions and assistant chat.
#[derive(Parser, Debug)]
#[command(name = "reefwatch", about = "Coral bleaching risk predictions and assistant chat")]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Config file, instead of the workspace or global reefwatch.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Prediction service URL override.
    #[arg(long, global = true)]
    pub base_url: Option<String>,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Predict the bleaching risk for a set of SST readings.
    Predict(predict::FormArgs),
    /// Predict, then discuss the assessment with the assistant.
    Analyze(chat::Analyze),
    /// Chat with the assistant.
    Chat(chat::Chat),
    /// Manage CLI configuration.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

/// Config management subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the resolved configuration.
    Show,
    /// Set a configuration value.
    Set {
        /// Configuration key, e.g. `server.base_url`.
        key: String,
        /// Configuration value.
        value: String,
    },
}

impl Cli {
    /// Resolve the config file and run the command.
    pub async fn run(self) -> Result<()> {
        let path = resolve_config_path(self.config.as_deref())?;
        let base_url = self.base_url;
        match self.command {
            Command::Predict(form) => predict::run(&form, &load(&path, base_url)?).await,
            Command::Analyze(analyze) => analyze.run(&load(&path, base_url)?).await,
            Command::Chat(chat) => chat.run(&load(&path, base_url)?).await,
            Command::Config { action } => config::run(&action, &path),
        }
    }
}

/// Load the config at `path`, applying the `--base-url` override.
fn load(path: &Path, base_url: Option<String>) -> Result<Config> {
    let mut config = Config::load(path)?;
    if let Some(base_url) = base_url {
        config.server.base_url = base_url;
    }
    tracing::debug!("using {} against {}", path.display(), config.server.base_url);
    Ok(config)
}
