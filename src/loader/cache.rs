//! Process-wide load cache
//!
//! Maps a request's package list to the result of the last successful load.
//! Entries are never evicted one by one; the whole registry is wiped when
//! the ambient release changes.

use crate::loader::LoadResult;
use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, info};

/// Separator between package identifiers in a cache key
pub const KEY_SEPARATOR: &str = ",";

/// Shared handle to the registry, created once per process
pub type SharedCache = Rc<RefCell<CacheRegistry>>;

/// Request identity: identifiers joined in request order.
///
/// Not sorted and not deduplicated, so `a,b` and `b,a` are distinct keys.
/// `["a,b"]` joins to the same key as `["a", "b"]`; `Uniloader::load`
/// rejects identifiers containing the separator before any lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn from_packages(packages: &[String]) -> Self {
        Self(packages.join(KEY_SEPARATOR))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cached load
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub result: LoadResult,
    pub stored_at: DateTime<Utc>,
}

/// Registry of successful loads
#[derive(Debug, Default)]
pub struct CacheRegistry {
    entries: HashMap<CacheKey, CacheEntry>,

    /// Release recorded at the last invalidation or successful load
    release: Option<String>,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry behind a shared handle
    pub fn shared() -> SharedCache {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn lookup(&self, key: &CacheKey) -> Option<LoadResult> {
        self.entries.get(key).map(|entry| entry.result.clone())
    }

    pub fn entry(&self, key: &CacheKey) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    pub fn store(&mut self, key: CacheKey, result: LoadResult) {
        debug!("Caching load result for [{}]", key);
        let entry = CacheEntry {
            result,
            stored_at: Utc::now(),
        };
        if self.entries.insert(key, entry).is_some() {
            debug!("Replaced an existing cache entry");
        }
    }

    /// Drop every entry and record `new_release` as current
    pub fn invalidate_all(&mut self, new_release: &str) {
        if !self.entries.is_empty() {
            info!(
                "Release changed to {}, dropping {} cached load(s)",
                new_release,
                self.entries.len()
            );
        }
        self.entries.clear();
        self.release = Some(new_release.to_string());
    }

    pub fn release(&self) -> Option<&str> {
        self.release.as_deref()
    }

    pub fn record_release(&mut self, release: &str) {
        self.release = Some(release.to_string());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn key(ids: &[&str]) -> CacheKey {
        let ids: Vec<String> = ids.iter().map(|s| s.to_string()).collect();
        CacheKey::from_packages(&ids)
    }

    #[test]
    fn key_keeps_request_order() {
        assert_eq!(key(&["a", "b"]).as_str(), "a,b");
        assert_ne!(key(&["a", "b"]), key(&["b", "a"]));
        assert_eq!(key(&["a", "a"]).as_str(), "a,a");
        assert_eq!(key(&[]).as_str(), "");
    }

    #[test]
    fn store_and_lookup() {
        let mut cache = CacheRegistry::new();
        let result = LoadResult::new(BTreeMap::new());

        assert!(cache.lookup(&key(&["a"])).is_none());
        cache.store(key(&["a"]), result.clone());

        let hit = cache.lookup(&key(&["a"])).unwrap();
        assert!(hit.same_instance(&result));
        assert!(cache.lookup(&key(&["b"])).is_none());
        assert!(cache.entry(&key(&["a"])).unwrap().stored_at <= Utc::now());
    }

    #[test]
    fn invalidate_all_clears_and_records() {
        let mut cache = CacheRegistry::new();
        cache.store(key(&["a"]), LoadResult::new(BTreeMap::new()));
        cache.store(key(&["b"]), LoadResult::new(BTreeMap::new()));
        assert_eq!(cache.len(), 2);

        cache.invalidate_all("R2");
        assert!(cache.is_empty());
        assert_eq!(cache.release(), Some("R2"));
    }
}
