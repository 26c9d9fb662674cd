//! Configuration structures for pollwatch.
//!
//! - [`TraversalConfig`] - How directory trees are enumerated
//! - [`WatchConfig`] - Poll cadence and event delivery
//! - [`Config`] - Root configuration, loadable from a JSON file
//!
//! All configuration types implement [`Default`], and every field can be
//! omitted from a configuration file.

use std::time::Duration;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default pause between two polls, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 16;

/// Default capacity of the event channel used by async watchers.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// Directory traversal options.
///
/// Both options are enabled by default.
///
/// # Examples
///
/// ```
/// use pw_core::TraversalConfig;
///
/// let config = TraversalConfig::default();
/// assert!(config.skip_permission_denied);
/// assert!(config.follow_directory_symlinks);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalConfig {
    /// Skip entries that cannot be read because of permissions, instead of
    /// failing the scan.
    pub skip_permission_denied: bool,

    /// Descend into directories reached through symbolic links.
    pub follow_directory_symlinks: bool,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            skip_permission_denied: true,
            follow_directory_symlinks: true,
        }
    }
}

/// Configuration for a watch session.
///
/// # Examples
///
/// ```
/// use pw_core::WatchConfig;
/// use std::time::Duration;
///
/// let config = WatchConfig::default();
/// assert_eq!(config.poll_interval(), Duration::from_millis(16));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Pause between polls in milliseconds. Zero polls back to back.
    pub poll_interval_ms: u64,

    /// Capacity of the event channel used by async watchers.
    pub channel_capacity: usize,

    /// Directory traversal options.
    pub traversal: TraversalConfig,
}

impl WatchConfig {
    /// Returns the poll interval as a [`Duration`].
    #[inline]
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Returns a copy with a different poll interval.
    #[must_use]
    pub const fn with_poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Checks option values that would make a watcher unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel_capacity == 0 {
            return Err(ConfigError::invalid_option(
                "watch.channel_capacity",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            traversal: TraversalConfig::default(),
        }
    }
}

/// Root configuration for pollwatch.
///
/// # Examples
///
/// ```
/// use pw_core::Config;
///
/// let config: Config = serde_json::from_str(r#"{"watch": {"poll_interval_ms": 250}}"#).unwrap();
/// assert_eq!(config.watch.poll_interval_ms, 250);
/// assert!(config.watch.traversal.follow_directory_symlinks);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Watch session configuration.
    pub watch: WatchConfig,
}

impl Config {
    /// Loads and validates a configuration from a JSON file.
    pub fn from_json_file(path: &Utf8Path) -> Result<Self, ConfigError> {
        let text =
            std::fs::read_to_string(path).map_err(|source| ConfigError::read(path, source))?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every section of the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.watch.validate()
    }
}
