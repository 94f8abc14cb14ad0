//! In-memory cache of page indexes, keyed by filter, order and page size.
//!
//! The cache holds no database state of its own, so it cannot tell when an
//! entry goes stale. Every write through [`crate::Catalog`] clears it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use arcadia_catalog::{FilterSpec, OrderSpec, PageIndex};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// SHA-256 of the serialized query signature, as lowercase hex.
///
/// Two filters that mean the same thing but serialize differently (terms in
/// another order, say) get different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(
        filter: &FilterSpec,
        order: &OrderSpec,
        page_size: u32,
    ) -> Result<Self, serde_json::Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Signature<'a> {
            filter: &'a FilterSpec,
            order: &'a OrderSpec,
            page_size: u32,
        }

        let bytes = serde_json::to_vec(&Signature {
            filter,
            order,
            page_size,
        })?;
        Ok(Self(hex_encode(&Sha256::digest(&bytes))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[derive(Debug, Default)]
struct CacheState {
    /// Bumped on every invalidation.
    generation: u64,
    entries: HashMap<CacheKey, Arc<PageIndex>>,
}

/// Shared page-index cache. Entries are immutable once published.
#[derive(Debug, Default)]
pub struct QueryCache {
    state: Mutex<CacheState>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    // The state is a plain map; a panic elsewhere cannot leave it half-updated.
    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<PageIndex>> {
        self.lock().entries.get(key).cloned()
    }

    /// Return the cached index for `key`, building it with `build` on a miss.
    ///
    /// `build` runs without the lock held. Its result is published only if no
    /// invalidation happened meanwhile; otherwise it is returned uncached.
    pub fn get_or_build<E, F>(&self, key: CacheKey, build: F) -> Result<Arc<PageIndex>, E>
    where
        F: FnOnce() -> Result<PageIndex, E>,
    {
        let generation = {
            let state = self.lock();
            if let Some(hit) = state.entries.get(&key) {
                log::debug!("Page index cache hit {}", &key.as_str()[..12]);
                return Ok(Arc::clone(hit));
            }
            state.generation
        };

        log::debug!("Page index cache miss {}", &key.as_str()[..12]);
        let index = Arc::new(build()?);

        let mut state = self.lock();
        if state.generation != generation {
            log::debug!("Cache invalidated during build, not storing index");
            return Ok(index);
        }
        // Another caller may have published the same key first; keep theirs.
        let entry = state.entries.entry(key).or_insert(index);
        Ok(Arc::clone(entry))
    }

    /// Drop every cached index.
    pub fn invalidate(&self) {
        let mut state = self.lock();
        let dropped = state.entries.len();
        state.entries.clear();
        state.generation += 1;
        if dropped > 0 {
            log::debug!("Invalidated {} cached page indexes", dropped);
        }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Number of invalidations so far.
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }
}
