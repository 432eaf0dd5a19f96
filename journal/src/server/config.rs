//! Command-line and file configuration for the journal server.

use std::path::{Path, PathBuf};

use clap::Parser;
use common::StorageConfig;

use crate::config::Config;
use crate::error::{Error, Result};

/// Command-line arguments for the journal server.
#[derive(Debug, Parser)]
#[command(name = "journal", about = "Correlation-scoped journal HTTP server")]
pub struct CliArgs {
    /// Path to a YAML configuration file.
    #[arg(short, long, env = "JOURNAL_CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Port to listen on.
    #[arg(short, long, default_value_t = 8080, env = "JOURNAL_PORT")]
    pub port: u16,

    /// Use in-memory storage, ignoring the configured backend.
    #[arg(long)]
    pub in_memory: bool,
}

impl CliArgs {
    /// Builds the journal configuration from the config file and flags.
    ///
    /// Without a config file every setting takes its default.
    pub fn to_journal_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => Config::default(),
        };
        if self.in_memory {
            config.storage = StorageConfig::InMemory;
        }
        Ok(config)
    }
}

/// Loads a journal configuration from a YAML file.
pub fn load_config(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        Error::InvalidConfig(format!("failed to read {}: {}", path.display(), e))
    })?;
    serde_yaml::from_str(&contents).map_err(|e| {
        Error::InvalidConfig(format!("failed to parse {}: {}", path.display(), e))
    })
}

/// Configuration for the HTTP server itself.
#[derive(Debug, Clone)]
pub struct JournalServerConfig {
    pub port: u16,
}

impl Default for JournalServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

impl From<&CliArgs> for JournalServerConfig {
    fn from(args: &CliArgs) -> Self {
        Self { port: args.port }
    }
}
