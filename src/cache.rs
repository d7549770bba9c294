use dashmap::DashMap;
use std::sync::Arc;

/// Thread-safe in-memory cache mapping identifier -> long URL.
///
/// Backed by a DashMap so reads are concurrent and lock-free for most cases.
/// Entries are added when a URL is shortened and backfilled after store
/// lookups; a miss always falls through to the store, so the cache can never
/// hide a freshly assigned identifier. Records are never deleted, so entries
/// never go stale.
#[derive(Clone, Debug)]
pub struct LinkCache {
    inner: Arc<DashMap<i64, String>>,
}

impl LinkCache {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
        }
    }

    /// Insert or update a mapping.
    pub fn set(&self, id: i64, url: impl Into<String>) {
        self.inner.insert(id, url.into());
    }

    /// Look up an identifier. Returns a clone of the long URL if present.
    pub fn get(&self, id: i64) -> Option<String> {
        self.inner.get(&id).map(|v| v.clone())
    }
}

impl Default for LinkCache {
    fn default() -> Self {
        Self::new()
    }
}
