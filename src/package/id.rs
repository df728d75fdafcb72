//! Package identifiers (`name` or `name.slice`)

use crate::error::{UniloadError, UniloadResult};
use std::fmt;

/// Slice selected by a bare package name
pub const DEFAULT_SLICE: &str = "main";

/// A parsed package identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageId {
    pub name: String,
    pub slice: Option<String>,
}

impl PackageId {
    /// Parse `name` or `name.slice`, validating both parts
    pub fn parse(id: &str) -> UniloadResult<Self> {
        let (name, slice) = match id.split_once('.') {
            Some((name, slice)) => (name, Some(slice)),
            None => (id, None),
        };

        validate_name(name).map_err(|reason| UniloadError::InvalidPackageId {
            id: id.to_string(),
            reason,
        })?;
        if let Some(slice) = slice {
            validate_name(slice).map_err(|reason| UniloadError::InvalidPackageId {
                id: id.to_string(),
                reason: format!("slice {}", reason),
            })?;
        }

        Ok(Self {
            name: name.to_string(),
            slice: slice.map(str::to_string),
        })
    }

    /// Slice to load, `main` when none was given
    pub fn slice_name(&self) -> &str {
        self.slice.as_deref().unwrap_or(DEFAULT_SLICE)
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.slice {
            Some(slice) => write!(f, "{}.{}", self.name, slice),
            None => f.write_str(&self.name),
        }
    }
}

/// Validate a package or slice name: non-empty, ASCII alphanumeric plus
/// `-` and `_`. This also keeps names safe to join onto a directory path.
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("name cannot be empty".to_string());
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(format!(
            "'{}' must contain only alphanumeric characters, hyphens, or underscores",
            name
        ));
    }
    Ok(())
}
