//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use beefline_data::{ApiClient, CattleListings, RetryPolicy, TimeoutConfig};
use beefline_search::history::SearchHistory;
use beefline_search::storage::{JsonFileStore, KeyValueStore};

use crate::config::CliConfig;
use crate::output::Output;

/// Config file names, in lookup order.
pub const CONFIG_NAMES: [&str; 3] = ["beefline.toml", ".beefline.toml", "beefline.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Where the configuration was loaded from, if anywhere.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = if let Some(path) = config_path {
            (CliConfig::load(path)?, Some(PathBuf::from(path)))
        } else {
            match find_config_file(&cwd) {
                Some(path) => {
                    let config = CliConfig::load(&path.to_string_lossy())?;
                    (config, Some(path))
                }
                None => (CliConfig::default(), None),
            }
        };

        if let Some(path) = &config_path {
            tracing::debug!(path = %path.display(), "loaded config");
        }

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Path of the key-value store file.
    pub fn store_path(&self) -> PathBuf {
        match &self.config.storage.path {
            Some(path) => self.resolve_path(path),
            None => data_dir().join("beefline").join("store.json"),
        }
    }

    /// Open the key-value store.
    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        Arc::new(JsonFileStore::new(self.store_path()))
    }

    /// Recent search history.
    pub fn history(&self) -> SearchHistory {
        SearchHistory::new(self.store())
    }

    /// Listings service for the configured API.
    pub fn listings(&self) -> Result<CattleListings> {
        let api = &self.config.api;
        let timeout = TimeoutConfig::from_total(Duration::from_millis(api.timeout_ms));
        let client = ApiClient::new(api.base_url.clone(), timeout)
            .with_context(|| format!("Invalid API base URL: {}", api.base_url))?
            .with_retry(RetryPolicy::new(api.max_retries))
            .with_token_store(self.store());
        Ok(CattleListings::new(client))
    }

    /// Resolve a path relative to the working directory. A leading `~/`
    /// expands to the home directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if let (Some(rest), Some(home)) = (path.strip_prefix("~/"), std::env::var_os("HOME")) {
            return PathBuf::from(home).join(rest);
        }
        if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }
}

/// Find a config file in `start` or its ancestors.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        for name in &CONFIG_NAMES {
            let config_path = current.join(name);
            if config_path.is_file() {
                return Some(config_path);
            }
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Get the platform-specific data directory.
fn data_dir() -> PathBuf {
    if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local").join("share")
    } else {
        std::env::temp_dir()
    }
}
