// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1
//! Content-addressed LRU cache for identification results
//!
//! Keys are hex SHA-256 digests of the decoded image bytes, so the same
//! photo always maps to the same entry regardless of its base64 framing.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use lru::LruCache;
use tracing::debug;

use crate::identify::client::IdentificationResult;

/// Default number of cached results.
pub const DEFAULT_CACHE_CAPACITY: usize = 2000;

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub result: IdentificationResult,
    pub cached_at: DateTime<Utc>,
}

pub struct IdentificationCache {
    inner: Mutex<LruCache<String, CacheEntry>>,
}

impl IdentificationCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .unwrap_or_else(|| NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap());
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Look up a result by digest, promoting the entry to most recent.
    pub fn get(&self, digest: &str) -> Option<CacheEntry> {
        let mut cache = self.inner.lock().unwrap();
        cache.get(digest).cloned()
    }

    /// Store a result, evicting the least recently used entry when full.
    pub fn put(&self, digest: String, result: IdentificationResult) -> DateTime<Utc> {
        let cached_at = Utc::now();
        let mut cache = self.inner.lock().unwrap();
        cache.put(
            digest.clone(),
            CacheEntry { result, cached_at },
        );
        debug!(digest = %digest, entries = cache.len(), "identification cached");
        cached_at
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for IdentificationCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
