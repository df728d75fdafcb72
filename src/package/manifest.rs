//! Package manifest parsing
//!
//! Each package directory has a `package.toml` describing its metadata,
//! dependencies and the exports of each slice.

use crate::error::{UniloadError, UniloadResult};
use crate::package::id::DEFAULT_SLICE;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// File name of a package manifest inside its directory
pub const MANIFEST_FILE: &str = "package.toml";

/// Parsed package manifest from package.toml
#[derive(Debug, Clone, Deserialize)]
pub struct PackageManifest {
    /// Package metadata
    pub package: PackageMeta,

    /// Dependency name to semver requirement
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,

    /// Slices by name. A manifest without slices gets an empty `main`.
    #[serde(default)]
    pub slices: BTreeMap<String, Slice>,
}

/// Package metadata section
#[derive(Debug, Clone, Deserialize)]
pub struct PackageMeta {
    /// Package name (must match directory name)
    pub name: String,

    /// Package version (semver)
    pub version: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Whether this is a prebuilt artifact or a local source package
    #[serde(default)]
    pub source: PackageSource,
}

/// Where a package's artifact came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageSource {
    /// Prebuilt and shipped alongside the tool; consumed verbatim
    #[default]
    Built,

    /// Local development package; dependency requirements are checked
    Local,
}

/// One slice of a package
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Slice {
    /// Exported values
    #[serde(default)]
    pub exports: toml::Table,
}

impl PackageManifest {
    /// Parse a manifest from a file on disk
    pub fn from_file(path: &Path) -> UniloadResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            UniloadError::io(format!("reading package manifest {}", path.display()), e)
        })?;
        Self::parse(&content, path)
    }

    /// Parse a manifest from a TOML string; `path` is only used in errors
    pub fn parse(content: &str, path: &Path) -> UniloadResult<Self> {
        let mut manifest: Self =
            toml::from_str(content).map_err(|e| UniloadError::ManifestInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        // Bare ids and dependents always link `main`, declared or not
        manifest
            .slices
            .entry(DEFAULT_SLICE.to_string())
            .or_default();
        Ok(manifest)
    }

    pub fn name(&self) -> &str {
        &self.package.name
    }

    pub fn slice(&self, name: &str) -> Option<&Slice> {
        self.slices.get(name)
    }

    pub fn slice_names(&self) -> Vec<String> {
        self.slices.keys().cloned().collect()
    }

    /// Parsed package version
    pub fn version(&self) -> Result<semver::Version, semver::Error> {
        semver::Version::parse(&self.package.version)
    }
}
