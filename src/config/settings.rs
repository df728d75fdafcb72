//! Effective settings for one load
//!
//! Flags and environment variables win over `[loader]` in the config file,
//! which wins over the built-in defaults.

use crate::config::schema::LoaderConfig;
use crate::loader::{FixedRelease, SharedCache, Uniloader};
use crate::package::{LocalToolchain, SourceMode};
use std::path::PathBuf;
use tracing::debug;

/// Per-invocation values that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct LoadOverrides {
    pub dir: Option<PathBuf>,
    pub release: Option<String>,
    pub checkout: bool,
}

/// Where to load from, under which release, in which source mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSettings {
    pub package_dir: PathBuf,
    pub release: String,
    pub source_mode: SourceMode,
}

impl LoadSettings {
    pub fn resolve(loader: &LoaderConfig, overrides: LoadOverrides) -> Self {
        let source_mode = if overrides.checkout {
            SourceMode::Checkout
        } else {
            loader.source_mode
        };

        Self {
            package_dir: overrides.dir.unwrap_or_else(|| loader.package_dir()),
            release: overrides.release.unwrap_or_else(|| loader.release()),
            source_mode,
        }
    }

    /// Build a loader over the local package directory sharing `cache`
    pub fn into_loader(self, cache: SharedCache) -> Uniloader {
        debug!(
            "Loading from {} (release {}, {:?})",
            self.package_dir.display(),
            self.release,
            self.source_mode
        );

        Uniloader::new(
            cache,
            LocalToolchain::new(self.source_mode),
            self.package_dir,
            FixedRelease::new(self.release),
        )
    }
}
