//! Result of a successful load

use serde_json::Value;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Package name to exports namespace.
///
/// Clones share the same underlying map, so a cached result handed out twice
/// is the same instance both times (see `same_instance`).
#[derive(Debug, Clone)]
pub struct LoadResult {
    packages: Rc<BTreeMap<String, Value>>,
}

impl LoadResult {
    pub fn new(packages: BTreeMap<String, Value>) -> Self {
        Self {
            packages: Rc::new(packages),
        }
    }

    /// Exports namespace of a loaded package
    pub fn get(&self, package: &str) -> Option<&Value> {
        self.packages.get(package)
    }

    pub fn package_names(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.packages.iter()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// True when both handles point at the same load
    pub fn same_instance(&self, other: &LoadResult) -> bool {
        Rc::ptr_eq(&self.packages, &other.packages)
    }

    /// Render as a JSON object keyed by package name
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.packages
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}
