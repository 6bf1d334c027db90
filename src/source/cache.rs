//! Uploaded document cache
//!
//! Lets a client upload a document once and re-check it by key, e.g. after
//! adding sources to the corpus.

use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;

struct CacheInner {
    lru: LruCache<String, Arc<Vec<u8>>>,
    total_bytes: usize,
}

/// LRU cache of document bytes bounded by entry count and total size
pub struct DocumentCache {
    inner: Mutex<CacheInner>,
    max_bytes: usize,
}

impl DocumentCache {
    pub fn new(capacity: usize, max_bytes: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(CacheInner {
                lru: LruCache::new(capacity),
                total_bytes: 0,
            }),
            max_bytes,
        }
    }

    /// Store a document under a fresh key.
    ///
    /// Returns `None` when the document alone exceeds the byte budget.
    /// Otherwise least recently used entries are evicted until it fits.
    pub fn insert(&self, data: Arc<Vec<u8>>) -> Option<String> {
        let size = data.len();
        if size > self.max_bytes {
            return None;
        }

        let mut inner = self.inner.lock();
        while inner.total_bytes + size > self.max_bytes {
            match inner.lru.pop_lru() {
                Some((_, evicted)) => {
                    inner.total_bytes = inner.total_bytes.saturating_sub(evicted.len())
                }
                None => break,
            }
        }

        let key = loop {
            let candidate = uuid::Uuid::new_v4().to_string();
            if !inner.lru.contains(&candidate) {
                break candidate;
            }
        };

        // A full cache evicts by count as well
        if let Some((_, evicted)) = inner.lru.push(key.clone(), data) {
            inner.total_bytes = inner.total_bytes.saturating_sub(evicted.len());
        }
        inner.total_bytes += size;

        Some(key)
    }

    pub fn get(&self, key: &str) -> Option<Arc<Vec<u8>>> {
        self.inner.lock().lru.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().lru.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().lru.is_empty()
    }

    /// Bytes held across all entries
    pub fn total_bytes(&self) -> usize {
        self.inner.lock().total_bytes
    }
}
