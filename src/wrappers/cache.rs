//! Decoded-plane cache for decorators that read one wrapped plane several
//! times.

use std::fmt;
use std::num::NonZeroUsize;

use lru::LruCache;
use tracing::debug;

use crate::error::ReaderResult;

/// Default number of planes kept: the last one decoded.
pub const DEFAULT_PLANE_CACHE_CAPACITY: usize = 1;

/// Key of a cached plane: the wrapped reader's plane index and series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PlaneKey {
    source: usize,
    series: usize,
}

/// LRU cache of planes decoded by a wrapped reader.
///
/// With the default capacity of one, asking for the same (source plane,
/// series) twice in a row decodes once and any other key evicts the entry.
/// Callers must call [`invalidate`](PlaneCache::invalidate) when the
/// underlying file changes.
pub struct PlaneCache {
    planes: LruCache<PlaneKey, Vec<u8>>,
    hits: u64,
    misses: u64,
}

impl Default for PlaneCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaneCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_PLANE_CACHE_CAPACITY)
    }

    /// A cache holding up to `capacity` planes (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            planes: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Return the cached bytes for `(source, series)`, loading them with
    /// `load` on a miss.
    ///
    /// A failed load caches nothing.
    pub fn get_or_load<F>(&mut self, source: usize, series: usize, load: F) -> ReaderResult<&[u8]>
    where
        F: FnOnce() -> ReaderResult<Vec<u8>>,
    {
        let key = PlaneKey { source, series };
        if self.planes.contains(&key) {
            self.hits += 1;
            debug!(source, series, "plane cache hit");
        } else {
            self.misses += 1;
            debug!(source, series, "plane cache miss");
        }
        let bytes = self.planes.try_get_or_insert(key, load)?;
        Ok(bytes.as_slice())
    }

    /// Drop every cached plane.
    pub fn invalidate(&mut self) {
        self.planes.clear();
    }

    /// Whether `(source, series)` is currently cached.
    pub fn contains(&self, source: usize, series: usize) -> bool {
        self.planes.contains(&PlaneKey { source, series })
    }

    /// Number of planes currently cached.
    pub fn len(&self) -> usize {
        self.planes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.planes.cap().get()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

impl fmt::Debug for PlaneCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaneCache")
            .field("len", &self.planes.len())
            .field("capacity", &self.capacity())
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .finish()
    }
}
