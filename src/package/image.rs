//! Image execution
//!
//! Runs linked units in order against an `Environment`. Each unit's
//! namespace starts as its manifest exports; when the host registered a
//! native initializer for the package, the initializer runs next and may
//! add exports or register startup hooks. The result holds the namespace
//! of every unit in the image, dependencies included.

use crate::error::{UniloadError, UniloadResult};
use crate::loader::{Bootstrap, Environment, Image, LoadResult, RuntimeConfig};
use crate::package::bundle::LinkedUnit;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use tracing::debug;

/// What an initializer sees while its package is being loaded
pub struct PackageContext<'a> {
    package: &'a str,
    imports: &'a BTreeMap<String, Value>,
    bootstrap: &'a Bootstrap,
    config: &'a RuntimeConfig,
    exports: &'a mut Map<String, Value>,
}

impl PackageContext<'_> {
    pub fn package(&self) -> &str {
        self.package
    }

    /// Namespace of a package loaded earlier in this image
    pub fn import(&self, package: &str) -> Option<&Value> {
        self.imports.get(package)
    }

    pub fn config(&self) -> &RuntimeConfig {
        self.config
    }

    /// Handle to the bootstrap namespace, for code that registers hooks later
    pub fn bootstrap(&self) -> Bootstrap {
        self.bootstrap.clone()
    }

    /// Current value of one of this package's exports
    pub fn exported(&self, key: &str) -> Option<&Value> {
        self.exports.get(key)
    }

    /// Add or replace an export of this package
    pub fn export(&mut self, key: impl Into<String>, value: Value) {
        self.exports.insert(key.into(), value);
    }

    /// Register a startup hook for this package
    pub fn on_startup<F>(&self, hook: F) -> UniloadResult<()>
    where
        F: FnOnce() -> UniloadResult<()> + 'static,
    {
        self.bootstrap.on_startup(self.package, hook)
    }
}

/// Native package initialization code supplied by the host tool
pub type Initializer = Box<dyn Fn(&mut PackageContext<'_>) -> UniloadResult<()>>;

/// Package name to initializer
#[derive(Default)]
pub struct InitializerRegistry {
    initializers: HashMap<String, Initializer>,
}

impl InitializerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, package: impl Into<String>, initializer: F)
    where
        F: Fn(&mut PackageContext<'_>) -> UniloadResult<()> + 'static,
    {
        self.initializers
            .insert(package.into(), Box::new(initializer));
    }

    pub fn get(&self, package: &str) -> Option<&Initializer> {
        self.initializers.get(package)
    }

    pub fn contains(&self, package: &str) -> bool {
        self.initializers.contains_key(package)
    }

    pub fn len(&self) -> usize {
        self.initializers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.initializers.is_empty()
    }
}

/// Image built by `LocalBundler`
pub struct LocalImage {
    id: String,
    units: Vec<LinkedUnit>,
    initializers: Rc<InitializerRegistry>,
}

impl LocalImage {
    pub fn new(
        id: String,
        units: Vec<LinkedUnit>,
        initializers: Rc<InitializerRegistry>,
    ) -> Self {
        Self {
            id,
            units,
            initializers,
        }
    }
}

impl Image for LocalImage {
    fn id(&self) -> &str {
        &self.id
    }

    fn load(&self, env: &Environment) -> UniloadResult<LoadResult> {
        let mut namespaces: BTreeMap<String, Value> = BTreeMap::new();

        for unit in &self.units {
            let mut exports = unit.exports.clone();

            if let Some(initializer) = self.initializers.get(&unit.package) {
                debug!("Initializing {}", unit.package);
                let mut ctx = PackageContext {
                    package: &unit.package,
                    imports: &namespaces,
                    bootstrap: env.bootstrap(),
                    config: env.config(),
                    exports: &mut exports,
                };
                initializer(&mut ctx).map_err(|e| UniloadError::Initializer {
                    package: unit.package.clone(),
                    source: Box::new(e),
                })?;
            }

            namespaces.insert(unit.package.clone(), Value::Object(exports));
        }

        Ok(LoadResult::new(namespaces))
    }
}
