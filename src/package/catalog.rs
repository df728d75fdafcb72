//! Package directory location and listing
//!
//! Packages live in a single local directory, one sub-directory per
//! package: `{package_dir}/{name}/package.toml`.

use crate::error::{UniloadError, UniloadResult};
use crate::package::manifest::{PackageManifest, PackageSource, MANIFEST_FILE};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Supplies the directory packages are loaded from
pub trait PackageLocator {
    fn package_dir(&self) -> PathBuf;
}

impl PackageLocator for PathBuf {
    fn package_dir(&self) -> PathBuf {
        self.clone()
    }
}

/// Default package directory (`~/.local/share/uniload/packages`)
pub fn default_package_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("uniload")
        .join("packages")
}

/// Manifest path for `name` under `dir`
pub fn manifest_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(name).join(MANIFEST_FILE)
}

/// A package found in the package directory
#[derive(Debug, Clone, Serialize)]
pub struct AvailablePackage {
    pub name: String,
    pub version: String,
    pub description: String,
    pub source: PackageSource,
    pub slices: Vec<String>,
}

/// List every package in `dir` with a readable manifest, sorted by name.
///
/// Sub-directories without a manifest are skipped. A manifest that fails
/// to parse is skipped with a debug log rather than failing the listing.
pub async fn list_available_packages(dir: &Path) -> UniloadResult<Vec<AvailablePackage>> {
    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            UniloadError::PackageDirNotFound(dir.to_path_buf())
        } else {
            UniloadError::io(format!("reading package directory {}", dir.display()), e)
        }
    })?;

    let mut packages = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| UniloadError::io("reading package directory entry", e))?
    {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let manifest_path = path.join(MANIFEST_FILE);
        let content = match tokio::fs::read_to_string(&manifest_path).await {
            Ok(c) => c,
            Err(_) => continue, // Not a package directory
        };
        match PackageManifest::parse(&content, &manifest_path) {
            Ok(manifest) => packages.push(AvailablePackage {
                name: manifest.package.name.clone(),
                version: manifest.package.version.clone(),
                description: manifest.package.description.clone(),
                source: manifest.package.source,
                slices: manifest.slice_names(),
            }),
            Err(e) => debug!("Skipping {}: {}", path.display(), e),
        }
    }

    packages.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(packages)
}
