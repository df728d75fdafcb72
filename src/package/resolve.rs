//! Package resolution
//!
//! Resolves requested identifiers against the local package directory into
//! a dependency graph ordered dependencies-first. Version requirements are
//! only checked for local source packages (or everything, in checkout
//! mode); prebuilt packages are taken as shipped.

use crate::loader::{Diagnostics, PackageResolver, ResolverOptions};
use crate::package::catalog::manifest_path;
use crate::package::id::{validate_name, PackageId, DEFAULT_SLICE};
use crate::package::manifest::{PackageManifest, PackageSource};
use semver::VersionReq;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::debug;

/// How the host tool is running, which decides whether the constraint
/// solver runs for every package
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// Running from a release: prebuilt packages are used verbatim
    #[default]
    Release,

    /// Running from a checkout: every package's requirements are checked
    Checkout,
}

/// A package in a resolved graph
#[derive(Debug, Clone)]
pub struct ResolvedPackage {
    pub manifest: PackageManifest,

    /// Slices to link, in the order they were first asked for
    pub slices: Vec<String>,

    /// Package directory
    pub dir: PathBuf,
}

impl ResolvedPackage {
    pub fn name(&self) -> &str {
        self.manifest.name()
    }
}

/// Resolved packages, dependencies before dependents, each exactly once
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    packages: Vec<ResolvedPackage>,

    /// Names of the directly requested packages, request order, no repeats
    requested: Vec<String>,
}

impl DependencyGraph {
    pub fn new(packages: Vec<ResolvedPackage>, requested: Vec<String>) -> Self {
        Self {
            packages,
            requested,
        }
    }

    pub fn packages(&self) -> &[ResolvedPackage] {
        &self.packages
    }

    pub fn requested(&self) -> &[String] {
        &self.requested
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedPackage> {
        self.packages.iter().find(|p| p.name() == name)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Resolver over a local package directory. Built fresh for every attempt.
pub struct LocalResolver<'a> {
    source_mode: SourceMode,
    project_constraints: &'a BTreeMap<String, VersionReq>,
}

impl<'a> LocalResolver<'a> {
    pub fn new(
        source_mode: SourceMode,
        project_constraints: &'a BTreeMap<String, VersionReq>,
    ) -> Self {
        Self {
            source_mode,
            project_constraints,
        }
    }

    fn solves_constraints(&self, package: &ResolvedPackage) -> bool {
        self.source_mode == SourceMode::Checkout
            || package.manifest.package.source == PackageSource::Local
    }

    fn check_constraints(
        &self,
        graph: &DependencyGraph,
        options: &ResolverOptions,
        diagnostics: &mut Diagnostics,
    ) {
        for package in graph.packages() {
            if !self.solves_constraints(package) {
                continue;
            }
            for (dep, requirement) in &package.manifest.dependencies {
                // Missing dependencies were already reported by the walk
                let Some(resolved) = graph.get(dep) else {
                    continue;
                };
                let req = match VersionReq::parse(requirement) {
                    Ok(req) => req,
                    Err(e) => {
                        diagnostics.resolution_error(
                            package.name(),
                            format!("invalid requirement '{}' on {}: {}", requirement, dep, e),
                        );
                        continue;
                    }
                };
                check_version(resolved, &req, package.name(), diagnostics);
            }
        }

        if options.ignore_project_constraints {
            return;
        }
        for (name, req) in self.project_constraints {
            if let Some(resolved) = graph.get(name) {
                check_version(resolved, req, "project", diagnostics);
            }
        }
    }
}

fn check_version(
    resolved: &ResolvedPackage,
    req: &VersionReq,
    required_by: &str,
    diagnostics: &mut Diagnostics,
) {
    match resolved.manifest.version() {
        Ok(version) if req.matches(&version) => {}
        Ok(version) => diagnostics.resolution_error(
            resolved.name(),
            format!(
                "{} requires {} {} but {} is available",
                required_by,
                resolved.name(),
                req,
                version
            ),
        ),
        Err(e) => diagnostics.resolution_error(
            resolved.name(),
            format!(
                "invalid version '{}': {}",
                resolved.manifest.package.version, e
            ),
        ),
    }
}

impl PackageResolver for LocalResolver<'_> {
    fn resolve(
        &self,
        packages: &[String],
        options: &ResolverOptions,
        diagnostics: &mut Diagnostics,
    ) -> Option<DependencyGraph> {
        let before = diagnostics.len();
        let mut walk = Walk::new(&options.search_dir, diagnostics);
        let mut requested: Vec<String> = Vec::new();

        for raw in packages {
            let id = match PackageId::parse(raw) {
                Ok(id) => id,
                Err(e) => {
                    walk.diagnostics.resolution_error(raw.clone(), e.to_string());
                    continue;
                }
            };
            walk.add_slice(&id.name, id.slice_name());
            if !requested.contains(&id.name) {
                requested.push(id.name.clone());
            }
            walk.visit(&id.name, None);
        }

        let Walk {
            mut manifests,
            order,
            mut slices,
            ..
        } = walk;
        let resolved = order
            .into_iter()
            .filter_map(|name| {
                let manifest = manifests.remove(&name)?;
                Some(ResolvedPackage {
                    dir: options.search_dir.join(&name),
                    slices: slices.remove(&name).unwrap_or_default(),
                    manifest,
                })
            })
            .collect();
        let graph = DependencyGraph::new(resolved, requested);

        self.check_constraints(&graph, options, diagnostics);

        if diagnostics.len() > before {
            return None;
        }
        debug!(
            "Resolved {} package(s) from {}: {}",
            graph.len(),
            options.search_dir.display(),
            graph
                .packages()
                .iter()
                .map(|p| p.name())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Some(graph)
    }
}

enum Visit {
    InProgress,
    Done,
}

/// Depth-first walk over manifests, recording problems as it goes
struct Walk<'w> {
    search_dir: &'w Path,
    diagnostics: &'w mut Diagnostics,
    manifests: HashMap<String, PackageManifest>,
    state: HashMap<String, Visit>,
    stack: Vec<String>,
    order: Vec<String>,
    slices: HashMap<String, Vec<String>>,
}

impl<'w> Walk<'w> {
    fn new(search_dir: &'w Path, diagnostics: &'w mut Diagnostics) -> Self {
        Self {
            search_dir,
            diagnostics,
            manifests: HashMap::new(),
            state: HashMap::new(),
            stack: Vec::new(),
            order: Vec::new(),
            slices: HashMap::new(),
        }
    }

    fn add_slice(&mut self, name: &str, slice: &str) {
        let slices = self.slices.entry(name.to_string()).or_default();
        if !slices.iter().any(|s| s == slice) {
            slices.push(slice.to_string());
        }
    }

    fn visit(&mut self, name: &str, required_by: Option<&str>) {
        match self.state.get(name) {
            Some(Visit::Done) => return,
            Some(Visit::InProgress) => {
                let start = self.stack.iter().position(|n| n == name).unwrap_or(0);
                let mut cycle: Vec<&str> = self.stack[start..].iter().map(String::as_str).collect();
                cycle.push(name);
                self.diagnostics
                    .resolution_error(name, format!("dependency cycle: {}", cycle.join(" -> ")));
                return;
            }
            None => {}
        }

        let Some(manifest) = self.read_manifest(name, required_by) else {
            // Report a missing or broken package once, however often it is used
            self.state.insert(name.to_string(), Visit::Done);
            return;
        };

        self.state.insert(name.to_string(), Visit::InProgress);
        self.stack.push(name.to_string());
        let deps: Vec<String> = manifest.dependencies.keys().cloned().collect();
        self.manifests.insert(name.to_string(), manifest);

        for dep in deps {
            if let Err(reason) = validate_name(&dep) {
                self.diagnostics
                    .resolution_error(name, format!("invalid dependency name: {}", reason));
                continue;
            }
            self.add_slice(&dep, DEFAULT_SLICE);
            self.visit(&dep, Some(name));
        }

        self.stack.pop();
        self.state.insert(name.to_string(), Visit::Done);
        self.order.push(name.to_string());
    }

    fn read_manifest(&mut self, name: &str, required_by: Option<&str>) -> Option<PackageManifest> {
        let path = manifest_path(self.search_dir, name);
        if !path.exists() {
            let message = match required_by {
                Some(parent) => format!(
                    "package not found (required by {}, searched {})",
                    parent,
                    self.search_dir.display()
                ),
                None => format!("package not found (searched {})", self.search_dir.display()),
            };
            self.diagnostics.resolution_error(name, message);
            return None;
        }

        match PackageManifest::from_file(&path) {
            Ok(manifest) if manifest.name() != name => {
                self.diagnostics.resolution_error(
                    name,
                    format!(
                        "manifest at {} declares package '{}'",
                        path.display(),
                        manifest.name()
                    ),
                );
                None
            }
            Ok(manifest) => Some(manifest),
            Err(e) => {
                self.diagnostics.resolution_error(name, e.to_string());
                None
            }
        }
    }
}
