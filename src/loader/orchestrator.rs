//! Load orchestration
//!
//! `Uniloader::load` is the request entry point. A cache hit returns the
//! earlier result untouched. A miss builds a fresh environment and runs
//! resolve, bundle, execute and hook drain inside one diagnostic scope,
//! committing to the cache only when the scope closes clean.

use crate::error::{UniloadError, UniloadResult};
use crate::loader::cache::{CacheKey, SharedCache, KEY_SEPARATOR};
use crate::loader::diagnostics::{self, Diagnostics};
use crate::loader::environment::Environment;
use crate::loader::release::ReleaseProvider;
use crate::loader::toolchain::{ResolverOptions, Toolchain};
use crate::loader::LoadResult;
use crate::package::PackageLocator;
use std::path::Path;
use tracing::{debug, info};

/// Bundler target used for in-process loads
pub const LOAD_TARGET: &str = "load";

/// A load request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Identifiers to load, each `name` or `name.slice`
    pub packages: Vec<String>,
}

impl LoadOptions {
    pub fn new<I, S>(packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            packages: packages.into_iter().map(Into::into).collect(),
        }
    }
}

/// Loads package sets into the running process and memoizes the results
pub struct Uniloader {
    cache: SharedCache,
    toolchain: Box<dyn Toolchain>,
    locator: Box<dyn PackageLocator>,
    release: Box<dyn ReleaseProvider>,
}

impl Uniloader {
    pub fn new(
        cache: SharedCache,
        toolchain: impl Toolchain + 'static,
        locator: impl PackageLocator + 'static,
        release: impl ReleaseProvider + 'static,
    ) -> Self {
        Self {
            cache,
            toolchain: Box::new(toolchain),
            locator: Box::new(locator),
            release: Box::new(release),
        }
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    /// Load `options.packages` and return package name to exports.
    ///
    /// Resolution and build problems fail the call with one
    /// `UniloadError::LoadFailed` carrying every message. A failing startup
    /// hook fails it with the hook's own error. Neither touches the cache.
    pub fn load(&self, options: &LoadOptions) -> UniloadResult<LoadResult> {
        // A separator inside one id would alias another request's key
        if let Some(id) = options.packages.iter().find(|id| id.contains(KEY_SEPARATOR)) {
            return Err(UniloadError::InvalidPackageId {
                id: id.clone(),
                reason: format!("'{}' separates identifiers in a request", KEY_SEPARATOR),
            });
        }

        let key = CacheKey::from_packages(&options.packages);
        let release = self.release.current_release();

        {
            let mut cache = self.cache.borrow_mut();
            if cache.release() != Some(release.as_str()) {
                cache.invalidate_all(&release);
            }
            if let Some(hit) = cache.lookup(&key) {
                debug!("Cache hit for [{}]", key);
                return Ok(hit);
            }
        }
        debug!("Cache miss for [{}] under release {}", key, release);

        let env = Environment::build();
        let search_dir = self.locator.package_dir();
        let label = format!("loading packages [{}]", key);

        let captured = diagnostics::capture(&label, |diagnostics| {
            self.attempt(&options.packages, &search_dir, &env, diagnostics)
        })?;
        let result = captured.into_result()?;

        let mut cache = self.cache.borrow_mut();
        cache.store(key, result.clone());
        cache.record_release(&release);

        info!(
            "Loaded {} package(s): {}",
            result.len(),
            result.package_names().collect::<Vec<_>>().join(", ")
        );
        Ok(result)
    }

    fn attempt(
        &self,
        packages: &[String],
        search_dir: &Path,
        env: &Environment,
        diagnostics: &mut Diagnostics,
    ) -> UniloadResult<Option<LoadResult>> {
        let resolver = self.toolchain.resolver();
        let options = ResolverOptions {
            ignore_project_constraints: true,
            search_dir: search_dir.to_path_buf(),
        };
        let Some(graph) = resolver.resolve(packages, &options, diagnostics) else {
            return Ok(None);
        };

        let bundler = self.toolchain.bundler();
        let Some(image) = bundler.build_image(&graph, LOAD_TARGET, diagnostics) else {
            return Ok(None);
        };

        // Never run code from a package set that reported problems.
        if diagnostics.has_messages() {
            return Ok(None);
        }

        debug!("Executing image {} in environment {}", image.id(), env.id());
        let result = image.load(env)?;

        let ran = env.bootstrap().drain()?;
        env.bootstrap().go_live();
        debug!("Ran {} startup hook(s)", ran);

        Ok(Some(result))
    }
}
