//! Configuration file parser for ~/.config/feedcycle/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are accepted but logged, since they are usually typos.
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::cycler::DEFAULT_PERIOD;
use crate::registry::FeedSeed;
use crate::util::validate_url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seconds without a successful load before advancing to the next feed.
    /// 0 disables cycling.
    pub cycle_interval_secs: u64,

    /// Per-request timeout for feed fetches. 0 = no timeout.
    pub request_timeout_secs: u64,

    /// Custom keybinding overrides. Keys are action names, values are key strings.
    pub keybindings: HashMap<String, String>,

    /// Feeds to read, in menu order. Empty means the built-in list.
    pub feeds: Vec<FeedSeed>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cycle_interval_secs: DEFAULT_PERIOD.as_secs(),
            request_timeout_secs: 0,
            keybindings: HashMap::new(),
            feeds: Vec::new(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 4] = [
        "cycle_interval_secs",
        "request_timeout_secs",
        "keybindings",
        "feeds",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing or empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as a warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // File deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        let config = Self::from_toml(&content)?;
        tracing::info!(
            path = %path.display(),
            cycle_interval_secs = config.cycle_interval_secs,
            feeds = config.feeds.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        Ok(toml::from_str(content)?)
    }

    /// Inactivity period for the cycler. Zero when cycling is disabled.
    pub fn cycle_period(&self) -> Duration {
        Duration::from_secs(self.cycle_interval_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    /// `[[feeds]]` entries whose URL passes [`validate_url`]. The rest are
    /// skipped with a warning, the same as OPML imports.
    pub fn valid_feeds(&self) -> Vec<FeedSeed> {
        self.feeds
            .iter()
            .filter(|seed| match validate_url(&seed.url) {
                Ok(_) => true,
                Err(err) => {
                    tracing::warn!(feed = %seed.name, url = %seed.url, error = %err, "Skipping invalid feed URL in config");
                    false
                }
            })
            .cloned()
            .collect()
    }
}
