//! Configuration management

use crate::bidi::{PropertyMap, QueueContext};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Printer device configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// USB Vendor ID
    #[serde(default)]
    pub vendor_id: u16,
    /// USB Product ID
    #[serde(default)]
    pub product_id: u16,
    /// USB interface number, when the printer exposes several
    #[serde(default)]
    pub interface: Option<i32>,
    /// Read timeout in milliseconds
    #[serde(default = "default_read_timeout")]
    pub read_timeout_ms: i32,
}

fn default_read_timeout() -> i32 {
    500
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            vendor_id: 0,
            product_id: 0,
            interface: None,
            read_timeout_ms: default_read_timeout(),
        }
    }
}

/// Status polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusConfig {
    /// Delay between status polls in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

fn default_poll_interval() -> u64 {
    1000
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
        }
    }
}

/// Property bags exposed to the extension as its script context
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertiesConfig {
    #[serde(default)]
    pub driver: PropertyMap,
    #[serde(default)]
    pub queue: PropertyMap,
}

impl PropertiesConfig {
    pub fn script_context(&self) -> QueueContext {
        QueueContext::new(self.driver.clone(), self.queue.clone())
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub status: StatusConfig,
    #[serde(default)]
    pub properties: PropertiesConfig,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, falling back to defaults if it is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "bidi-extension", "BidiExtension")
            .context("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Get the default configuration embedded in the binary
    pub fn default_config_str() -> &'static str {
        include_str!("../../config/default.toml")
    }
}
