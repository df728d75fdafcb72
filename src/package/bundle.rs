//! Image building
//!
//! Links a resolved graph into a single `LocalImage`: one unit per package,
//! in graph order, each carrying the exports of its requested slices. The
//! image id is derived from a SHA256 over the target and every unit.

use crate::loader::{Bundler, Diagnostics, Image};
use crate::package::image::{InitializerRegistry, LocalImage};
use crate::package::resolve::{DependencyGraph, ResolvedPackage};
use serde_json::{Map, Number, Value};
use sha2::{Digest, Sha256};
use std::rc::Rc;
use tracing::debug;

/// A linked package inside an image
#[derive(Debug, Clone)]
pub struct LinkedUnit {
    pub package: String,
    pub version: String,
    pub slices: Vec<String>,

    /// Merged exports of every linked slice; later slices win on conflicts
    pub exports: Map<String, Value>,
}

/// Bundler for packages from the local package directory
pub struct LocalBundler {
    initializers: Rc<InitializerRegistry>,
}

impl LocalBundler {
    pub fn new(initializers: Rc<InitializerRegistry>) -> Self {
        Self { initializers }
    }
}

impl Bundler for LocalBundler {
    fn build_image(
        &self,
        graph: &DependencyGraph,
        target: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<Box<dyn Image>> {
        let before = diagnostics.len();

        let units: Vec<LinkedUnit> = graph
            .packages()
            .iter()
            .map(|package| link_unit(package, diagnostics))
            .collect();

        if diagnostics.len() > before {
            return None;
        }

        let id = compute_image_id(target, &units);
        debug!("Built image {} with {} unit(s)", id, units.len());

        Some(Box::new(LocalImage::new(
            id,
            units,
            Rc::clone(&self.initializers),
        )))
    }
}

fn link_unit(package: &ResolvedPackage, diagnostics: &mut Diagnostics) -> LinkedUnit {
    let mut exports = Map::new();

    for slice_name in &package.slices {
        let Some(slice) = package.manifest.slice(slice_name) else {
            diagnostics.build_error(
                package.name(),
                format!(
                    "slice '{}' is not defined (available: {})",
                    slice_name,
                    package.manifest.slice_names().join(", ")
                ),
            );
            continue;
        };

        for (key, value) in &slice.exports {
            match toml_to_json(value) {
                Ok(json) => {
                    exports.insert(key.clone(), json);
                }
                Err(reason) => diagnostics.build_error(
                    package.name(),
                    format!("export '{}' in slice '{}': {}", key, slice_name, reason),
                ),
            }
        }
    }

    LinkedUnit {
        package: package.name().to_string(),
        version: package.manifest.package.version.clone(),
        slices: package.slices.clone(),
        exports,
    }
}

/// Convert an exported TOML value into its JSON form.
///
/// Datetimes become strings. Non-finite floats have no JSON form and fail.
fn toml_to_json(value: &toml::Value) -> Result<Value, String> {
    Ok(match value {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Integer(i) => Value::Number((*i).into()),
        toml::Value::Float(f) => Number::from_f64(*f)
            .map(Value::Number)
            .ok_or_else(|| format!("{} cannot be exported", f))?,
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(
            items
                .iter()
                .map(toml_to_json)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        toml::Value::Table(table) => Value::Object(
            table
                .iter()
                .map(|(k, v)| toml_to_json(v).map(|v| (k.clone(), v)))
                .collect::<Result<Map<_, _>, _>>()?,
        ),
    })
}

/// Compute a deterministic image id from the target and linked units.
///
/// Unlike request cache keys, unit order is link order, which is already
/// canonical for a given graph.
fn compute_image_id(target: &str, units: &[LinkedUnit]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(target.as_bytes());

    for unit in units {
        hasher.update(unit.package.as_bytes());
        hasher.update(unit.version.as_bytes());
        for slice in &unit.slices {
            hasher.update(slice.as_bytes());
        }
        // serde_json maps are key-ordered, so this is stable
        hasher.update(Value::Object(unit.exports.clone()).to_string().as_bytes());
    }

    let hash = hex::encode(hasher.finalize());
    format!("uniload-{}-{}", target, &hash[..12])
}
