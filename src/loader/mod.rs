//! In-process package loading
//!
//! Loads a named set of prebuilt packages into the running process and
//! memoizes the result per request.
//!
//! # Load lifecycle
//!
//! | Step | Component | Notes |
//! |------|-----------|-------|
//! | key + release check | `CacheRegistry` | release change wipes every entry |
//! | hit | `CacheRegistry` | returned as-is, nothing else runs |
//! | miss | `Environment` | fresh per attempt, bootstrap buffering |
//! | resolve, bundle, execute | `Toolchain` | inside one `Diagnostics` scope |
//! | drain hooks, go live | `Bootstrap` | FIFO, first failure aborts |
//! | commit | `CacheRegistry` | only when no diagnostics were recorded |

pub mod cache;
pub mod diagnostics;
pub mod environment;
pub mod orchestrator;
pub mod release;
mod result;
pub mod toolchain;

pub use cache::{CacheEntry, CacheKey, CacheRegistry, SharedCache};
pub use diagnostics::{capture, Captured, Diagnostic, DiagnosticKind, Diagnostics};
pub use environment::{Bootstrap, BootstrapMode, Environment, RuntimeConfig, CONTEXT_TAG};
pub use orchestrator::{LoadOptions, Uniloader, LOAD_TARGET};
pub use release::{FixedRelease, ReleaseProvider, DEFAULT_RELEASE};
pub use result::LoadResult;
pub use toolchain::{Bundler, Image, PackageResolver, ResolverOptions, Toolchain};
