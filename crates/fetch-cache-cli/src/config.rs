use std::path::PathBuf;
use std::time::Duration;

use fetch_cache::DecompressionMode;
use fetch_cache_http::FetcherConfig;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AppConfig {
    /// Overrides the per-user cache directory.
    pub cache_dir: Option<PathBuf>,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
    #[serde(default)]
    pub decompression: DecompressionMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_read_timeout(),
            decompression: DecompressionMode::default(),
        }
    }
}

fn default_connect_timeout() -> u64 {
    8
}

fn default_read_timeout() -> u64 {
    24
}

impl AppConfig {
    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            cache_root: self.cache_dir.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            read_timeout: Duration::from_secs(self.read_timeout_secs),
            decompression: self.decompression,
            ..FetcherConfig::default()
        }
    }
}

/// Config file path: `~/.config/fetch-cache/config.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("fetch-cache").join("config.toml"))
}

/// Load config from file, falling back to defaults if missing.
pub fn load_config() -> AppConfig {
    if let Some(path) = config_path()
        && let Ok(contents) = std::fs::read_to_string(&path)
    {
        match toml::from_str::<AppConfig>(&contents) {
            Ok(config) => return config,
            Err(e) => warn!(
                "failed to parse config at {}, using defaults: {e}",
                path.display()
            ),
        }
    }

    AppConfig::default()
}
