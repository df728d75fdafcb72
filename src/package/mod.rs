//! Local package directory support
//!
//! Packages are prebuilt units described by a `package.toml` manifest in
//! `{package_dir}/{name}/`. This module provides the concrete resolver,
//! bundler and image executor the loader drives, bundled up as
//! `LocalToolchain`.

pub mod bundle;
pub mod catalog;
pub mod id;
pub mod image;
pub mod manifest;
pub mod resolve;

pub use bundle::{LinkedUnit, LocalBundler};
pub use catalog::{
    default_package_dir, list_available_packages, AvailablePackage, PackageLocator,
};
pub use id::{PackageId, DEFAULT_SLICE};
pub use image::{Initializer, InitializerRegistry, LocalImage, PackageContext};
pub use manifest::{PackageManifest, PackageSource, MANIFEST_FILE};
pub use resolve::{DependencyGraph, LocalResolver, ResolvedPackage, SourceMode};

use crate::loader::{Bundler, PackageResolver, Toolchain};
use semver::VersionReq;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Resolver + bundler over the local package directory
#[derive(Default)]
pub struct LocalToolchain {
    source_mode: SourceMode,
    project_constraints: BTreeMap<String, VersionReq>,
    initializers: Rc<InitializerRegistry>,
}

impl LocalToolchain {
    pub fn new(source_mode: SourceMode) -> Self {
        Self {
            source_mode,
            ..Self::default()
        }
    }

    /// Native initializers to run when their packages load
    pub fn with_initializers(mut self, initializers: InitializerRegistry) -> Self {
        self.initializers = Rc::new(initializers);
        self
    }

    /// Host project constraints. Only applied by resolvers that are not
    /// told to ignore them.
    pub fn with_project_constraints(mut self, constraints: BTreeMap<String, VersionReq>) -> Self {
        self.project_constraints = constraints;
        self
    }

    pub fn source_mode(&self) -> SourceMode {
        self.source_mode
    }
}

impl Toolchain for LocalToolchain {
    fn resolver(&self) -> Box<dyn PackageResolver + '_> {
        Box::new(LocalResolver::new(
            self.source_mode,
            &self.project_constraints,
        ))
    }

    fn bundler(&self) -> Box<dyn Bundler + '_> {
        Box::new(LocalBundler::new(Rc::clone(&self.initializers)))
    }
}
