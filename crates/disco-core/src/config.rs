//! Configuration for discovery sessions.
//!
//! Settings are read from a TOML file and then overridden by environment
//! variables.
//!
//! ## Configuration Hierarchy
//!
//! 1. **Defaults**: [`DiscoveryConfig::default`]
//! 2. **Config file**: `<config dir>/disco/config.toml`, or an explicit path
//! 3. **Environment variables**: `DISCO_*` prefix
//!
//! ## Example Configuration File
//!
//! ```toml
//! timeout_secs = 15
//! user_agent = "disco/0.4 (+https://example.com/bot)"
//! max_redirects = 5
//! max_passes = 32
//! max_references = 2000
//! ```
//!
//! ## Examples
//!
//! ```rust
//! use disco_core::DiscoveryConfig;
//!
//! let config = DiscoveryConfig::default();
//! assert_eq!(config.timeout_secs, 30);
//! assert_eq!(config.max_passes, 64);
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings for the transport and the fixed-point traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Per-request timeout in seconds.
    ///
    /// The only bound on how long a single fetch may block.
    pub timeout_secs: u64,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,

    /// Maximum HTTP redirects followed by one fetch.
    pub max_redirects: usize,

    /// Maximum passes of the fixed-point loop before giving up.
    pub max_passes: usize,

    /// Maximum size of the reference table before giving up.
    pub max_references: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("disco/", env!("CARGO_PKG_VERSION")).to_string(),
            max_redirects: 10,
            max_passes: 64,
            max_references: 10_000,
        }
    }
}

impl DiscoveryConfig {
    /// Load configuration from the default location, falling back to defaults.
    ///
    /// Environment overrides are applied in either case.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file exists but cannot be read
    /// - The config file contains invalid TOML
    /// - An environment override is not a valid value
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::debug!("no platform config directory; using defaults");
                Self::default().with_env_overrides()
            },
        }
    }

    /// Load configuration from `path`; a missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Same as [`DiscoveryConfig::load`].
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| Error::Config(format!("Failed to read config: {e}")))?;
            tracing::debug!("loaded config from {}", path.display());
            toml::from_str(&content)
                .map_err(|e| Error::Config(format!("Failed to parse config: {e}")))?
        } else {
            Self::default()
        };
        config.with_env_overrides()
    }

    /// Apply `DISCO_*` environment variables on top of this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric override does not parse.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(value) = lookup("DISCO_TIMEOUT_SECS") {
            self.timeout_secs = parse_override("DISCO_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = lookup("DISCO_USER_AGENT") {
            if !value.trim().is_empty() {
                self.user_agent = value;
            }
        }
        if let Some(value) = lookup("DISCO_MAX_REDIRECTS") {
            self.max_redirects = parse_override("DISCO_MAX_REDIRECTS", &value)?;
        }
        if let Some(value) = lookup("DISCO_MAX_PASSES") {
            self.max_passes = parse_override("DISCO_MAX_PASSES", &value)?;
        }
        if let Some(value) = lookup("DISCO_MAX_REFERENCES") {
            self.max_references = parse_override("DISCO_MAX_REFERENCES", &value)?;
        }
        Ok(self)
    }

    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Save the configuration to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {e}")))?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;
        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config: {e}")))?;
        Ok(())
    }

    /// Platform path of the default config file.
    ///
    /// - Linux: `~/.config/disco/config.toml`
    /// - macOS: `~/Library/Application Support/disco/config.toml`
    /// - Windows: `%APPDATA%\disco\config.toml`
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        directories::BaseDirs::new().map(|dirs| dirs.config_dir().join("disco").join("config.toml"))
    }
}

fn parse_override<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::Config(format!("Invalid value for {key} ('{value}'): {e}")))
}
