use std::{num::NonZeroUsize, sync::Arc, time::Duration};

use lru::LruCache;
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::debug;

use super::models::{ReferenceCategory, ReferencePage};

/// Key of one cached reference page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub category: ReferenceCategory,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    stored_at: Instant,
    page: Arc<ReferencePage>,
}

/// Process-wide TTL cache for reference collections.
///
/// Expired entries are dropped lazily when read. Once `capacity` is reached,
/// an insert evicts the least recently used entry in constant time.
/// Concurrent inserts for the same key simply overwrite each other.
pub struct ReferenceCache {
    entries: Mutex<LruCache<CacheKey, CacheEntry>>,
    ttl: Duration,
}

impl ReferenceCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Cached page for `key`, if present and younger than the TTL.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<ReferencePage>> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let hit = match entries.get(key) {
            Some(entry) if now.duration_since(entry.stored_at) < self.ttl => {
                Some(entry.page.clone())
            }
            Some(_) => None,
            None => return None,
        };

        if hit.is_none() {
            entries.pop(key);
            debug!(category = %key.category, page = key.page, "reference cache entry expired");
        }
        hit
    }

    /// Store `page` under `key` with the current timestamp.
    pub fn insert(&self, key: CacheKey, page: ReferencePage) -> Arc<ReferencePage> {
        let page = Arc::new(page);
        let entry = CacheEntry {
            stored_at: Instant::now(),
            page: page.clone(),
        };
        if let Some((evicted, _)) = self.entries.lock().push(key, entry) {
            if evicted != key {
                debug!(category = %evicted.category, page = evicted.page, "evicted reference page");
            }
        }
        page
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
