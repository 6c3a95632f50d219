// ABOUTME: Runtime configuration - CLI/env values layered over an optional TOML file
// ABOUTME: Resolves the API location, credentials, database path and lookup concurrency

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::remote::client::DEFAULT_API_URL;
use crate::sync::DEFAULT_CONCURRENCY;

/// Contents of a `ynab-sync.toml` file. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub budget_id: Option<String>,
    pub database: Option<PathBuf>,
    pub concurrency: Option<usize>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse config file {:?}", path))
    }
}

/// Values given on the command line or through the environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub budget_id: Option<String>,
    pub database: Option<PathBuf>,
    pub concurrency: Option<usize>,
}

#[derive(Clone)]
pub struct Config {
    pub api_url: String,
    pub api_key: String,
    pub budget_id: String,
    pub database: PathBuf,
    pub concurrency: usize,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_url", &self.api_url)
            .field("api_key", &"***")
            .field("budget_id", &self.budget_id)
            .field("database", &self.database)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

impl Config {
    /// Command line and environment win over the file, the file wins over defaults.
    pub fn resolve(overrides: Overrides, file: FileConfig) -> Result<Self> {
        let database = database_path(&overrides, &file)?;
        let api_key = overrides
            .api_key
            .or(file.api_key)
            .filter(|key| !key.trim().is_empty())
            .context("YNAB API key not provided. Use `--api-key` or set YNAB_API_KEY")?;
        let budget_id = overrides
            .budget_id
            .or(file.budget_id)
            .filter(|id| !id.trim().is_empty())
            .context("YNAB budget id not provided. Use `--budget-id` or set YNAB_BUDGET_ID")?;

        let concurrency = overrides
            .concurrency
            .or(file.concurrency)
            .unwrap_or(DEFAULT_CONCURRENCY);
        if concurrency == 0 {
            bail!("concurrency must be at least 1");
        }

        Ok(Self {
            api_url: overrides
                .api_url
                .or(file.api_url)
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            api_key,
            budget_id,
            database,
            concurrency,
        })
    }
}

/// Database location alone, for commands that never talk to the API.
pub fn database_path(overrides: &Overrides, file: &FileConfig) -> Result<PathBuf> {
    match overrides.database.as_ref().or(file.database.as_ref()) {
        Some(path) => Ok(path.clone()),
        None => default_database_path(),
    }
}

/// `~/.ynab-sync/ynab.db`
pub fn default_database_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(".ynab-sync").join("ynab.db"))
}
