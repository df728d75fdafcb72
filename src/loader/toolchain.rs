//! Collaborator interfaces driven by the orchestrator
//!
//! The orchestrator knows nothing about manifests, versions or linking.
//! It asks a `Toolchain` for a fresh resolver and bundler on every cache
//! miss and executes whatever image comes back.

use crate::error::UniloadResult;
use crate::loader::{Diagnostics, Environment, LoadResult};
use crate::package::DependencyGraph;
use std::path::PathBuf;

/// Options handed to the resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Skip any project-level dependency constraints of the host
    pub ignore_project_constraints: bool,

    /// The only directory packages may be found in
    pub search_dir: PathBuf,
}

/// Turns package identifiers into a dependency graph
pub trait PackageResolver {
    /// Resolve `packages`. Problems are recorded in `diagnostics`; `None`
    /// means no usable graph was produced.
    fn resolve(
        &self,
        packages: &[String],
        options: &ResolverOptions,
        diagnostics: &mut Diagnostics,
    ) -> Option<DependencyGraph>;
}

/// Builds a single executable image from a resolved graph
pub trait Bundler {
    fn build_image(
        &self,
        graph: &DependencyGraph,
        target: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<Box<dyn Image>>;
}

/// Executable unit produced by a bundler
pub trait Image {
    /// Identifier of the built image (for logs)
    fn id(&self) -> &str;

    /// Run the image against `env` and return the exports of every package
    /// it loaded.
    ///
    /// Package initialization may register startup hooks on the
    /// environment's bootstrap namespace. Errors are faults in package code.
    fn load(&self, env: &Environment) -> UniloadResult<LoadResult>;
}

/// Factory for per-attempt collaborators.
///
/// A new resolver and bundler are requested for every cache miss so no
/// resolver state survives from one request to the next.
pub trait Toolchain {
    fn resolver(&self) -> Box<dyn PackageResolver + '_>;

    fn bundler(&self) -> Box<dyn Bundler + '_>;
}
