//! Configuration schema for uniload
//!
//! Configuration is stored at `~/.config/uniload/config.toml`

use crate::error::{UniloadError, UniloadResult};
use crate::loader::DEFAULT_RELEASE;
use crate::package::{default_package_dir, SourceMode};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Package loading settings
    pub loader: LoaderConfig,
}

impl Config {
    /// Keys accepted by `set`
    pub const KEYS: &'static [&'static str] = &[
        "general.verbose",
        "general.log_format",
        "loader.package_dir",
        "loader.release",
        "loader.source_mode",
    ];

    /// Set a dot-separated key from its string form
    pub fn set(&mut self, key: &str, value: &str) -> UniloadResult<()> {
        match key.split_once('.') {
            Some(("general", "verbose")) => self.general.verbose = parse_bool(value)?,
            Some(("general", "log_format")) => match value {
                "text" | "json" => self.general.log_format = value.to_string(),
                _ => {
                    return Err(UniloadError::User(format!(
                        "Invalid log format: {}. Use text/json",
                        value
                    )))
                }
            },
            Some(("loader", "package_dir")) => self.loader.package_dir = Some(PathBuf::from(value)),
            Some(("loader", "release")) => self.loader.release = Some(value.to_string()),
            Some(("loader", "source_mode")) => self.loader.source_mode = parse_source_mode(value)?,
            _ => {
                return Err(UniloadError::User(format!(
                    "Unknown config key: {}. Valid keys: {}",
                    key,
                    Self::KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> UniloadResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(UniloadError::User(format!(
            "Invalid boolean value: {}. Use true/false",
            value
        ))),
    }
}

fn parse_source_mode(value: &str) -> UniloadResult<SourceMode> {
    match value {
        "release" => Ok(SourceMode::Release),
        "checkout" => Ok(SourceMode::Checkout),
        _ => Err(UniloadError::User(format!(
            "Invalid source mode: {}. Use release/checkout",
            value
        ))),
    }
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,

    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_format: "text".to_string(),
        }
    }
}

/// Package loading configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Directory holding one sub-directory per package
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_dir: Option<PathBuf>,

    /// Release the tool runs under; a change invalidates cached loads
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,

    /// "release" uses prebuilt packages verbatim, "checkout" checks every
    /// dependency requirement
    pub source_mode: SourceMode,
}

impl LoaderConfig {
    /// Configured package directory, or the default under the data dir
    pub fn package_dir(&self) -> PathBuf {
        self.package_dir.clone().unwrap_or_else(default_package_dir)
    }

    /// Configured release, or `none`
    pub fn release(&self) -> String {
        self.release
            .clone()
            .unwrap_or_else(|| DEFAULT_RELEASE.to_string())
    }
}
