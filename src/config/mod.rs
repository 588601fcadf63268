//! Configuration management for Panels.
//!
//! Configuration is read from `~/.config/panels/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

use crate::domain::PublicationKind;
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://gateway.marvel.com:443/v1/public/";
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub feed: FeedConfig,
}

/// Catalog endpoint and credentials.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub public_key: String,
    pub private_key: String,
    /// Items per page, sent as `limit`
    pub page_size: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            public_key: String::new(),
            private_key: String::new(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout_secs: 10,
            user_agent: "panels/0.1.0".to_string(),
        }
    }
}

impl ApiConfig {
    pub fn has_credentials(&self) -> bool {
        !self.public_key.trim().is_empty() && !self.private_key.trim().is_empty()
    }
}

/// Defaults for the `feed` command.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub default_kind: PublicationKind,
    /// Pages to load, including the first
    pub pages: u32,
    /// How long to wait for a page or image before giving up
    pub wait_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            default_kind: PublicationKind::Comic,
            pages: 1,
            wait_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/panels/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("panels").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    fn default_config_content() -> String {
        r##"# Panels Configuration
#
# Keys are issued at https://developer.marvel.com/account.
# Every request is signed with md5(ts + private_key + public_key).

[api]
base_url = "https://gateway.marvel.com:443/v1/public/"
public_key = ""
private_key = ""

# Items per page (the catalog allows up to 100)
page_size = 20

# Request timeout in seconds
timeout_secs = 10

user_agent = "panels/0.1.0"

[feed]
# One of: comic, series, story, event
default_kind = "comic"

# Pages to load, including the first
pages = 1

# Seconds to wait for a page or image before giving up
wait_secs = 30
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_deserializes() {
        let content = Config::default_config_content();
        let config: Config = toml::from_str(&content).expect("Default config should be valid TOML");

        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.page_size, 20);
        assert_eq!(config.feed.default_kind, PublicationKind::Comic);
        assert!(!config.api.has_credentials());
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[api]
public_key = "1234"
private_key = "abcd"

[feed]
default_kind = "event"
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert!(config.api.has_credentials());
        assert_eq!(config.feed.default_kind, PublicationKind::Event);
        // Defaults
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.feed.pages, 1);
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");
        assert_eq!(config.api.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.feed.wait_secs, 30);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[api]\npage_size = 50\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api.page_size, 50);
    }

    #[test]
    fn test_load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[api\npage_size = ").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
