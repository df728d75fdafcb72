//! Error types for uniload
//!
//! All modules use `UniloadResult<T>` as their return type.

use crate::loader::Diagnostics;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for uniload operations
pub type UniloadResult<T> = Result<T, UniloadError>;

/// All errors that can occur in uniload
#[derive(Error, Debug)]
pub enum UniloadError {
    // Load errors
    #[error("Errors prevented package load:\n{0}")]
    LoadFailed(Diagnostics),

    #[error("Startup hook registered by '{package}' failed: {source}")]
    StartupHook {
        package: String,
        #[source]
        source: Box<UniloadError>,
    },

    #[error("Initializer for package '{package}' failed: {source}")]
    Initializer {
        package: String,
        #[source]
        source: Box<UniloadError>,
    },

    #[error("Invalid package identifier '{id}': {reason}")]
    InvalidPackageId { id: String, reason: String },

    // Package directory errors
    #[error("Invalid package manifest at {path}: {reason}")]
    ManifestInvalid { path: PathBuf, reason: String },

    #[error("Package directory not found: {0}")]
    PackageDirNotFound(PathBuf),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl UniloadError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Wrap a failure raised by package code (a hook or an initializer)
    pub fn startup_hook(package: impl Into<String>, source: UniloadError) -> Self {
        Self::StartupHook {
            package: package.into(),
            source: Box::new(source),
        }
    }

    /// True when the failure came from loaded package code rather than
    /// from resolving or building the package set
    pub fn is_package_fault(&self) -> bool {
        matches!(self, Self::StartupHook { .. } | Self::Initializer { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::LoadFailed(_) => Some("Run: uniload list (to see which packages are available)"),
            Self::PackageDirNotFound(_) => {
                Some("Pass --dir, set UNILOAD_DIR, or run: uniload config set loader.package_dir <path>")
            }
            Self::InvalidPackageId { .. } => {
                Some("Package identifiers look like 'name' or 'name.slice'")
            }
            _ => None,
        }
    }
}
