// src/config.rs

//! Defines the configuration structures for the `readypoll` watcher.
//!
//! Settings are deserialized from a JSON file named by the `READYPOLL_CONFIG`
//! environment variable. Every field has a default, so a partial file (or no
//! file at all) is fine.

use log::{debug, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::event::PollEvents;
use crate::timeout;

/// Environment variable holding the path of the JSON config file.
pub const CONFIG_ENV_VAR: &str = "READYPOLL_CONFIG";

/// Process-wide configuration, loaded on first use.
pub static CONFIG: Lazy<Config> = Lazy::new(Config::load_or_default);

// --- Top-Level Configuration Structure ---

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)] // Apply default values for the entire struct if a field is missing.
pub struct Config {
    /// Wait settings.
    pub poll: PollConfig,
    /// What to watch and for how long.
    pub watch: WatchConfig,
}

impl Config {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Reads the file named by [`CONFIG_ENV_VAR`], falling back to defaults.
    pub fn load_or_default() -> Self {
        let Some(path) = std::env::var_os(CONFIG_ENV_VAR) else {
            debug!("{} not set, using default configuration", CONFIG_ENV_VAR);
            return Config::default();
        };
        match Self::from_file(Path::new(&path)) {
            Ok(config) => {
                debug!("Loaded configuration: {:?}", config);
                config
            }
            Err(e) => {
                warn!("{:#}. Using default configuration.", e);
                Config::default()
            }
        }
    }
}

// --- Poll Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PollConfig {
    /// Microseconds per wait. Negative blocks until something is ready,
    /// zero only checks and returns.
    pub timeout_us: i64,
}

impl Default for PollConfig {
    fn default() -> Self {
        PollConfig {
            timeout_us: timeout::INFINITE,
        }
    }
}

// --- Watch Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WatchConfig {
    /// Pollset capacity; watching more paths than this is an error.
    pub capacity: usize,
    /// Interest registered for every watched descriptor.
    pub events: PollEvents,
    /// Stop after this many waits. `None` runs until nothing is left to watch.
    pub max_rounds: Option<u64>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        WatchConfig {
            capacity: 64,
            events: PollEvents::READABLE,
            max_rounds: None,
        }
    }
}
