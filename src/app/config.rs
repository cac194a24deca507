use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_CACHE_DIR_NAME, DEFAULT_CACHE_TTL_HOURS, DEFAULT_HISTORY_FILE_NAME,
    HISTORY_MAX_ENTRIES, MAX_SUGGESTIONS,
};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Result cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Analysis history configuration
    #[serde(default)]
    pub history: HistoryConfig,

    /// Place search configuration
    #[serde(default)]
    pub search: SearchConfig,
}

/// Result cache configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding one JSON file per cached analysis
    pub dir: PathBuf,
    /// Age after which an entry is discarded
    pub ttl_hours: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir().join(DEFAULT_CACHE_DIR_NAME),
            ttl_hours: DEFAULT_CACHE_TTL_HOURS,
        }
    }
}

/// Analysis history configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// JSON file holding the log
    pub file: PathBuf,
    /// Oldest entries beyond this are evicted
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            file: default_data_dir().join(DEFAULT_HISTORY_FILE_NAME),
            max_entries: HISTORY_MAX_ENTRIES,
        }
    }
}

/// Place search configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Suggestions returned per query
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: MAX_SUGGESTIONS,
        }
    }
}

/// Load configuration from multiple sources
///
/// Later sources win: defaults, global config, project config, an explicit
/// `--config` file, then `MARKET_GAP_` environment variables
/// (`MARKET_GAP_CACHE__TTL_HOURS=6`).
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let global_config = get_config_dir()?.join("config.toml");
    let local_config = PathBuf::from(".market-gap/config.toml");

    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    if global_config.exists() {
        figment = figment.merge(Toml::file(&global_config));
    }

    if local_config.exists() {
        figment = figment.merge(Toml::file(&local_config));
    }

    if let Some(path) = explicit {
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed("MARKET_GAP_").split("__"));

    figment
        .extract()
        .context("Failed to load configuration")
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "market-gap") {
        Ok(proj_dirs.config_dir().to_path_buf())
    } else {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .context("Could not determine home directory")?;
        Ok(PathBuf::from(home).join(".config").join("market-gap"))
    }
}

/// Where stores live unless configured otherwise
fn default_data_dir() -> PathBuf {
    ProjectDirs::from("", "", "market-gap")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".market-gap"))
}

/// Save configuration to file
pub fn save_config(config: &Config, path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(p) => p,
        None => get_config_dir()?.join("config.toml"),
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let toml_string = toml::to_string_pretty(config)?;
    std::fs::write(&path, toml_string)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

/// Create a default configuration file if it doesn't exist; returns its path
pub fn init_config() -> Result<PathBuf> {
    let config_file = get_config_dir()?.join("config.toml");

    if !config_file.exists() {
        save_config(&Config::default(), Some(config_file.clone()))?;
    }

    Ok(config_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.cache.ttl_hours, 24);
        assert_eq!(config.history.max_entries, 100);
        assert_eq!(config.search.max_results, 8);
        assert!(config.history.file.ends_with("analysis_history.json"));
    }

    #[test]
    fn test_explicit_file_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[cache]\nttl_hours = 6\ndir = \"/tmp/market-gap-cache\"\n",
        )
        .unwrap();

        let config = load_config(Some(path.as_path())).unwrap();
        assert_eq!(config.cache.ttl_hours, 6);
        assert_eq!(config.cache.dir, PathBuf::from("/tmp/market-gap-cache"));
        assert_eq!(config.history, HistoryConfig::default());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.toml");
        assert!(load_config(Some(missing.as_path())).is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("saved.toml");
        let mut config = Config::default();
        config.search.max_results = 5;

        save_config(&config, Some(path.clone())).unwrap();
        let reloaded: Config = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reloaded, config);
    }
}
