//! Uniload - in-process loading of prebuilt packages
//!
//! Resolves a requested set of packages from a local package directory,
//! links them into an image, executes it and memoizes the result for the
//! rest of the process.

pub mod cli;
pub mod config;
pub mod error;
pub mod loader;
pub mod package;

pub use error::{UniloadError, UniloadResult};
pub use loader::{LoadOptions, LoadResult, Uniloader};
