//! Ambient release identifier

/// Release used when neither the command line nor the config names one
pub const DEFAULT_RELEASE: &str = "none";

/// Supplies the release the host tool is currently operating under.
///
/// Asked once per `load` call; a different answer from the previous
/// successful load invalidates the whole cache.
pub trait ReleaseProvider {
    fn current_release(&self) -> String;
}

/// A release that never changes for the life of the process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedRelease(String);

impl FixedRelease {
    pub fn new(release: impl Into<String>) -> Self {
        Self(release.into())
    }
}

impl Default for FixedRelease {
    fn default() -> Self {
        Self::new(DEFAULT_RELEASE)
    }
}

impl ReleaseProvider for FixedRelease {
    fn current_release(&self) -> String {
        self.0.clone()
    }
}

impl<F> ReleaseProvider for F
where
    F: Fn() -> String,
{
    fn current_release(&self) -> String {
        self()
    }
}
