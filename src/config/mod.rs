//! Configuration for uniload
//!
//! A single TOML file, `~/.config/uniload/config.toml` unless `--config`
//! points elsewhere. `LoadSettings` layers command-line overrides on top of
//! its `[loader]` section.

pub mod schema;
pub mod settings;

pub use schema::Config;
pub use settings::{LoadOverrides, LoadSettings};

use crate::error::{UniloadError, UniloadResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Reads and writes the config file
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::with_path(Self::default_config_path())
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// `<config_dir>/uniload/config.toml`
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("uniload")
            .join("config.toml")
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Read the config file. No file means every default applies.
    pub async fn load(&self) -> UniloadResult<Config> {
        let content = match fs::read_to_string(&self.config_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", self.config_path.display());
                return Ok(Config::default());
            }
            Err(e) => {
                return Err(UniloadError::io(
                    format!("reading config from {}", self.config_path.display()),
                    e,
                ))
            }
        };

        toml::from_str(&content).map_err(|e| UniloadError::ConfigInvalid {
            path: self.config_path.clone(),
            reason: e.to_string(),
        })
    }

    /// Write `config` as pretty TOML, creating the directory if needed
    pub async fn save(&self, config: &Config) -> UniloadResult<()> {
        if let Some(dir) = self.config_path.parent() {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| UniloadError::ConfigDirCreate {
                    path: dir.to_path_buf(),
                    source: e,
                })?;
        }

        fs::write(&self.config_path, toml::to_string_pretty(config)?)
            .await
            .map_err(|e| {
                UniloadError::io(format!("writing config to {}", self.config_path.display()), e)
            })?;
        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Write the default config. Returns false, leaving the file alone, when
    /// one exists and `force` is not set.
    pub async fn init(&self, force: bool) -> UniloadResult<bool> {
        if !force && fs::try_exists(&self.config_path).await.unwrap_or(false) {
            return Ok(false);
        }
        self.save(&Config::default()).await?;
        Ok(true)
    }

    /// Apply `key = value` to `config` and persist the result
    pub async fn set(&self, config: &Config, key: &str, value: &str) -> UniloadResult<Config> {
        let mut updated = config.clone();
        updated.set(key, value)?;
        self.save(&updated).await?;
        Ok(updated)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
