//! Rendered-output cache for documentation lookups
//!
//! Every successful non-empty backend invocation is cached under the
//! composite key (query, selection, width) for the lifetime of the process.
//! Entries are never invalidated: documentation pages do not change while
//! the engine is running, and re-rendering the same page always produces
//! the same lines, so overwrites are idempotent.
//!
//! A second map caches the boolean result of existence probes for backends
//! that do not support numbered disambiguation, so repeated probes for the
//! same query never spawn a process.

use std::sync::Arc;

use moka::sync::Cache;

/// Composite key identifying one cached rendering
///
/// A query looked up with a different disambiguation selection or a
/// different formatting width is a different rendering and caches
/// separately.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// The search term as given by the user
    pub query: String,
    /// Disambiguation selection, if the entry was reached through one
    pub selection: Option<u32>,
    /// Formatting width the backend rendered at
    pub width: u16,
}

impl CacheKey {
    /// Create a cache key for a query rendering
    #[must_use]
    pub fn new(query: impl Into<String>, selection: Option<u32>, width: u16) -> Self {
        Self {
            query: query.into(),
            selection,
            width,
        }
    }
}

/// Process-lifetime cache of rendered documentation
///
/// Cheap to clone; clones share the underlying storage. Any component may
/// read, but only the command runner and job scheduler write (see
/// [`crate::runner`]).
#[derive(Clone)]
pub struct DocCache {
    lines: Cache<CacheKey, Arc<Vec<String>>>,
    existence: Cache<String, bool>,
}

impl DocCache {
    /// Create an empty cache
    ///
    /// Both maps are unbounded: entries live until the process exits.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: Cache::builder().build(),
            existence: Cache::builder().build(),
        }
    }

    /// Look up cached lines for a key
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<Arc<Vec<String>>> {
        self.lines.get(key)
    }

    /// Store rendered lines under a key
    ///
    /// Idempotent: storing equal content under an existing key is harmless.
    pub fn insert(&self, key: CacheKey, lines: Arc<Vec<String>>) {
        self.lines.insert(key, lines);
    }

    /// Whether a key is populated
    #[must_use]
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.lines.contains_key(key)
    }

    /// Cached existence-probe result for a query, if one was recorded
    #[must_use]
    pub fn existence(&self, query: &str) -> Option<bool> {
        self.existence.get(query)
    }

    /// Record the result of an existence probe
    pub fn record_existence(&self, query: impl Into<String>, exists: bool) {
        self.existence.insert(query.into(), exists);
    }
}

impl Default for DocCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_keys_cache_separately() {
        let cache = DocCache::new();
        let bare = CacheKey::new("sort", None, 80);
        let selected = CacheKey::new("sort", Some(1), 80);
        let narrow = CacheKey::new("sort", Some(1), 40);

        cache.insert(bare.clone(), Arc::new(vec!["bare".into()]));
        cache.insert(selected.clone(), Arc::new(vec!["selected".into()]));

        assert_eq!(cache.get(&bare).unwrap()[0], "bare");
        assert_eq!(cache.get(&selected).unwrap()[0], "selected");
        assert!(cache.get(&narrow).is_none());
    }

    #[test]
    fn test_insert_is_idempotent() {
        let cache = DocCache::new();
        let key = CacheKey::new("printf", None, 80);
        let lines = Arc::new(vec!["PRINTF(1)".to_string()]);

        cache.insert(key.clone(), lines.clone());
        cache.insert(key.clone(), lines);

        assert_eq!(cache.get(&key).unwrap().as_slice(), ["PRINTF(1)"]);
    }

    #[test]
    fn test_existence_probe_results() {
        let cache = DocCache::new();
        assert_eq!(cache.existence("printf"), None);

        cache.record_existence("printf", true);
        cache.record_existence("frobnicate", false);

        assert_eq!(cache.existence("printf"), Some(true));
        assert_eq!(cache.existence("frobnicate"), Some(false));
    }

    #[test]
    fn test_clones_share_storage() {
        let cache = DocCache::new();
        let clone = cache.clone();
        let key = CacheKey::new("grep", None, 100);

        clone.insert(key.clone(), Arc::new(vec!["GREP(1)".into()]));
        assert!(cache.contains(&key));
    }
}
