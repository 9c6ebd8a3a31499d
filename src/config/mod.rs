//! Configuration management for tideline.
//!
//! Configuration is read from `~/.config/tideline/config.toml` unless another
//! path is given on the command line. If the default file doesn't exist, a
//! commented template is written there and the defaults are used.

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::FeedSource;
use crate::fetcher::http_fetcher::DEFAULT_TIMEOUT_SECS;
use crate::fetcher::parallel::DEFAULT_WORKERS;

pub const DEFAULT_MAX_ENTRIES_PER_FEED: usize = 3;

/// Main configuration struct.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Upper bound on entries reported per feed and run.
    pub max_entries_per_feed: usize,
    /// Watermark database; defaults to the platform data directory.
    pub watermark_db: Option<PathBuf>,
    pub workers: usize,
    pub timeout_secs: u64,
    /// Resolve relative `img`/`a` URLs in entry content against the feed link.
    pub replace_relative_urls: bool,
    pub reddit: Option<RedditConfig>,
    pub feeds: Vec<FeedSource>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries_per_feed: DEFAULT_MAX_ENTRIES_PER_FEED,
            watermark_db: None,
            workers: DEFAULT_WORKERS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            replace_relative_urls: false,
            reddit: None,
            feeds: Vec::new(),
        }
    }
}

/// Application credentials for reddit's client-credentials grant.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RedditConfig {
    pub client_id: String,
    pub client_secret: String,
}

impl RedditConfig {
    pub fn is_valid(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.trim().is_empty()
    }
}

impl Config {
    /// Load configuration from `path`, or from the default path.
    ///
    /// An explicit path must exist. A missing default file is created with
    /// comments. Missing fields use default values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default_path = Self::default_config_path()?;
                if !default_path.exists() {
                    Self::create_default_config(&default_path)?;
                    tracing::info!("Wrote default configuration to {}", default_path.display());
                    return Ok(Self::default());
                }
                default_path
            }
        };

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: config_path,
                source,
            },
            other => other,
        })
    }

    /// Parse and validate a configuration document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_entries_per_feed == 0 {
            return Err(ConfigError::Invalid(
                "max_entries_per_feed must be at least 1".into(),
            ));
        }
        if self.workers == 0 {
            return Err(ConfigError::Invalid("workers must be at least 1".into()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be at least 1".into()));
        }
        for (i, feed) in self.feeds.iter().enumerate() {
            if feed.name.trim().is_empty() || feed.url.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "feed #{} needs both a name and a url",
                    i + 1
                )));
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Reddit credentials, if both halves are configured.
    pub fn reddit_credentials(&self) -> Option<&RedditConfig> {
        self.reddit.as_ref().filter(|r| r.is_valid())
    }

    /// The configured watermark database, or `<data_dir>/tideline/watermarks.db`.
    pub fn watermark_db_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.watermark_db {
            Some(path) => Ok(path.clone()),
            None => {
                let data_dir = dirs::data_dir().ok_or(ConfigError::NoDataDir)?;
                Ok(data_dir.join("tideline").join("watermarks.db"))
            }
        }
    }

    /// Get the default config file path: `~/.config/tideline/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("tideline").join("config.toml"))
    }

    /// Create a default config file with comments.
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

    fn default_config_content() -> &'static str {
        r##"# tideline configuration

# Maximum number of new entries reported per feed and run
max_entries_per_feed = 3

# Where watermarks are kept (defaults to the platform data directory)
# watermark_db = "/var/lib/tideline/watermarks.db"

# Concurrent downloads and per-request timeout
workers = 10
timeout_secs = 30

# Rewrite relative img/a URLs in entry content against the feed's link
replace_relative_urls = false

# Application-only reddit access, used for reddit.com/r/... feeds
# [reddit]
# client_id = ""
# client_secret = ""

# [[feeds]]
# name = "Go blog"
# url = "https://blog.golang.org/feed.atom"
#
# [[feeds]]
# name = "Paused"
# url = "https://example.com/rss.xml"
# disabled = true
"##
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Could not determine data directory")]
    NoDataDir,

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

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
