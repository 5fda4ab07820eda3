//! CLI configuration.

use anyhow::{Context, Result};
use beefline_data::DEFAULT_BASE_URL;
use beefline_search::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};

/// CLI configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Listings API.
    #[serde(default)]
    pub api: ApiConfig,

    /// Search behavior.
    #[serde(default)]
    pub search: SearchConfig,

    /// Local storage for history and the auth token.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    /// Save config to a file.
    pub fn save(&self, path: &str) -> Result<()> {
        let content = if path.ends_with(".json") {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path))
    }
}

/// Listings API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Total request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Retries after a failed request.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_max_retries() -> u32 {
    1
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
        }
    }
}

/// Search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Listings per page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Settle window for interactive input, in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_debounce_ms() -> u64 {
    300
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// Storage settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Store file (default: `~/.local/share/beefline/store.json`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Generate a default beefline.toml config file.
pub fn generate_default_config() -> String {
    format!(
        r#"# Beefline CLI configuration

[api]
base_url = "{base_url}"
timeout_ms = {timeout_ms}
max_retries = {max_retries}

[search]
page_size = {page_size}
debounce_ms = {debounce_ms}

[storage]
# path = "~/.local/share/beefline/store.json"
"#,
        base_url = DEFAULT_BASE_URL,
        timeout_ms = default_timeout_ms(),
        max_retries = default_max_retries(),
        page_size = default_page_size(),
        debounce_ms = default_debounce_ms(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_config_is_default() {
        let config: CliConfig = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: CliConfig = toml::from_str(
            r#"
            [api]
            base_url = "https://api.beefline.test/api"

            [search]
            page_size = 24
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://api.beefline.test/api");
        assert_eq!(config.api.timeout_ms, 10_000);
        assert_eq!(config.search.page_size, 24);
        assert_eq!(config.search.debounce_ms, 300);
        assert_eq!(config.storage.path, None);
    }

    #[test]
    fn test_json_round_trip_through_file() {
        let path = std::env::temp_dir().join(format!("beefline-config-{}.json", std::process::id()));
        let path = path.to_str().unwrap();

        let mut config = CliConfig::default();
        config.storage.path = Some("/tmp/beefline-store.json".to_string());
        config.save(path).unwrap();

        assert_eq!(CliConfig::load(path).unwrap(), config);
        std::fs::remove_file(path).unwrap();
    }
}
