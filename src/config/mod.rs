//! Configuration management
//!
//! This module handles loading and parsing configuration for the admin list
//! screens. Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

pub mod screens;

pub use screens::{ScreenDefinition, ScreenPreset};

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::models::PageSize;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Admin API configuration
    #[serde(default)]
    pub api: ApiConfig,
    /// List controller defaults
    #[serde(default)]
    pub list: ListSettings,
    /// Screen the binary opens
    #[serde(default)]
    pub screen: ScreenPreset,
}

/// Admin API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every resource path is joined onto
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Bearer token sent with every request
    #[serde(default)]
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            token: None,
        }
    }
}

impl ApiConfig {
    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// List controller defaults shared by every screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListSettings {
    /// Initial page size (10, 25, 50 or 100)
    #[serde(default)]
    pub page_size: PageSize,
    /// Search debounce window in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for ListSettings {
    fn default() -> Self {
        Self {
            page_size: PageSize::default(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl ListSettings {
    /// Debounce window as a `Duration`
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn default_debounce_ms() -> u64 {
    300
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError {
        path: String,
        message: String,
    },
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            }
        })?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables follow the pattern:
    /// - MEDIADESK_API_BASE_URL
    /// - MEDIADESK_API_TIMEOUT_SECS
    /// - MEDIADESK_API_TOKEN
    /// - MEDIADESK_LIST_PAGE_SIZE
    /// - MEDIADESK_LIST_DEBOUNCE_MS
    /// - MEDIADESK_SCREEN
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        // API configuration
        if let Ok(base_url) = std::env::var("MEDIADESK_API_BASE_URL") {
            self.api.base_url = base_url;
        }
        if let Ok(timeout) = std::env::var("MEDIADESK_API_TIMEOUT_SECS") {
            if let Ok(timeout) = timeout.parse::<u64>() {
                self.api.timeout_secs = timeout;
            }
        }
        if let Ok(token) = std::env::var("MEDIADESK_API_TOKEN") {
            self.api.token = Some(token).filter(|t| !t.is_empty());
        }

        // List configuration
        if let Ok(size) = std::env::var("MEDIADESK_LIST_PAGE_SIZE") {
            if let Some(size) = size
                .parse::<usize>()
                .ok()
                .and_then(|n| PageSize::try_from(n).ok())
            {
                self.list.page_size = size;
            }
        }
        if let Ok(debounce) = std::env::var("MEDIADESK_LIST_DEBOUNCE_MS") {
            if let Ok(debounce) = debounce.parse::<u64>() {
                self.list.debounce_ms = debounce;
            }
        }

        if let Ok(screen) = std::env::var("MEDIADESK_SCREEN") {
            if let Ok(screen) = screen.parse::<ScreenPreset>() {
                self.screen = screen;
            }
        }
    }

    /// Check values that deserialize fine but cannot be used
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "api.base_url must not be empty".to_string(),
            ));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "api.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.list.debounce_ms == 0 {
            return Err(ConfigError::ValidationError(
                "list.debounce_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared by every test module that touches MEDIADESK_* variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
const ENV_KEYS: [&str; 6] = [
    "MEDIADESK_API_BASE_URL",
    "MEDIADESK_API_TIMEOUT_SECS",
    "MEDIADESK_API_TOKEN",
    "MEDIADESK_LIST_PAGE_SIZE",
    "MEDIADESK_LIST_DEBOUNCE_MS",
    "MEDIADESK_SCREEN",
];

#[cfg(test)]
fn clear_env() {
    for key in ENV_KEYS {
        std::env::remove_var(key);
    }
}
