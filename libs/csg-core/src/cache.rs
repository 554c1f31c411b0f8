//! # Cache Layer (C4)
//!
//! Two independent, size-bounded LRU caches keyed by fingerprint string:
//! one for concrete [`crate::geometry::Geometry`], one for a boolean
//! kernel's internal representation. Both are process-wide singletons
//! guarded by a single mutex each, so that parallel evaluation (§5) can
//! serialize cache mutations without serializing geometry computation.

use std::sync::Mutex;

use lru::LruCache;
use once_cell::sync::OnceCell;

use crate::geometry::{Geometry, GeometryKernel};

/// A size-bounded LRU cache keyed by fingerprint string.
///
/// The `lru` crate's own capacity is entry-count based; this wrapper tracks
/// the summed byte size of its entries and evicts least-recently-used
/// entries until a new insertion fits within the byte budget.
pub struct ByteBoundedCache<V> {
    entries: LruCache<String, (V, usize)>,
    current_bytes: usize,
    max_bytes: usize,
}

impl<V: Clone> ByteBoundedCache<V> {
    /// Builds an empty cache with the given byte budget.
    pub fn new(max_bytes: usize) -> Self {
        Self {
            // Unbounded by entry count; bounded by `max_bytes` instead.
            entries: LruCache::unbounded(),
            current_bytes: 0,
            max_bytes,
        }
    }

    /// True if `key` is present. Does not affect recency.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains(key)
    }

    /// Fetches a clone of the cached value, promoting it to most-recently
    /// used. Callers should check [`Self::contains`] first per the cache
    /// layer's documented discipline, though this also tolerates a miss.
    pub fn get(&mut self, key: &str) -> Option<V> {
        self.entries.get(key).map(|(v, _)| v.clone())
    }

    /// Inserts `value` of `size_bytes` under `key`, evicting
    /// least-recently-used entries as needed. Returns `false` without
    /// modifying the cache if `size_bytes` alone exceeds the total budget
    /// (the caller should log a `CacheOverflow` warning in that case).
    pub fn insert(&mut self, key: String, value: V, size_bytes: usize) -> bool {
        if size_bytes > self.max_bytes {
            return false;
        }
        if let Some((_, old_size)) = self.entries.pop(&key) {
            self.current_bytes -= old_size;
        }
        while self.current_bytes + size_bytes > self.max_bytes {
            match self.entries.pop_lru() {
                Some((_, (_, evicted_size))) => self.current_bytes -= evicted_size,
                None => break,
            }
        }
        self.entries.put(key, (value, size_bytes));
        self.current_bytes += size_bytes;
        true
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.current_bytes = 0;
    }

    /// Changes the byte budget, evicting least-recently-used entries
    /// immediately if the new budget is smaller than current usage.
    pub fn set_max_size(&mut self, bytes: usize) {
        self.max_bytes = bytes;
        while self.current_bytes > self.max_bytes {
            match self.entries.pop_lru() {
                Some((_, (_, evicted_size))) => self.current_bytes -= evicted_size,
                None => break,
            }
        }
    }

    /// The cache's configured byte budget.
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Current number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Returns the process-wide default geometry cache.
///
/// Only the geometry cache (a concrete, non-generic type) can be a true
/// cross-call singleton backed by a plain `static`; the kernel cache is
/// parameterized over the kernel implementation and is sized per
/// [`CacheContext`] instance instead (see [`CacheContext::default`]).
fn default_geometry_cache() -> &'static Mutex<ByteBoundedCache<Geometry>> {
    static CACHE: OnceCell<Mutex<ByteBoundedCache<Geometry>>> = OnceCell::new();
    CACHE.get_or_init(|| {
        Mutex::new(ByteBoundedCache::new(
            config::constants::DEFAULT_GEOMETRY_CACHE_BYTES,
        ))
    })
}

/// An explicit, passable cache context bundling the geometry cache and the
/// kernel-representation cache for one kernel type `K`.
///
/// The core never reaches for a bare global; every evaluator entry point
/// takes a `&CacheContext<K>` so tests can construct isolated contexts and
/// parallel callers can still share one context across worker threads
/// (both caches are internally mutex-guarded).
pub struct CacheContext<K: GeometryKernel> {
    /// Fingerprint → concrete geometry.
    pub geometry: Mutex<ByteBoundedCache<Geometry>>,
    /// Fingerprint → kernel-internal 3D representation.
    pub kernel: Mutex<ByteBoundedCache<K::Repr3D>>,
}

impl<K: GeometryKernel> CacheContext<K> {
    /// Builds a fresh, isolated context with the given byte budgets.
    pub fn new(geometry_cache_bytes: usize, kernel_cache_bytes: usize) -> Self {
        Self {
            geometry: Mutex::new(ByteBoundedCache::new(geometry_cache_bytes)),
            kernel: Mutex::new(ByteBoundedCache::new(kernel_cache_bytes)),
        }
    }
}

impl<K: GeometryKernel + 'static> Default for CacheContext<K> {
    /// A convenience context sized per
    /// [`config::constants::DEFAULT_GEOMETRY_CACHE_BYTES`] and
    /// [`config::constants::DEFAULT_KERNEL_CACHE_BYTES`]. Callers that want
    /// one cache context shared across an entire process (single-threaded
    /// or parallel) should build one `CacheContext` with
    /// [`CacheContext::new`] and hold it behind an `Arc`, passing clones of
    /// the `Arc` to every evaluation; `Default::default()` is a
    /// throwaway-sized convenience for call sites (tests, one-off renders)
    /// that don't need that sharing.
    fn default() -> Self {
        // Priming the geometry singleton keeps its initialization cost off
        // the first real evaluation even when every caller builds its own
        // `CacheContext`; kernel caches have no non-generic singleton to
        // prime since they're parameterized over `K`.
        let _ = default_geometry_cache();
        Self::new(
            config::constants::DEFAULT_GEOMETRY_CACHE_BYTES,
            config::constants::DEFAULT_KERNEL_CACHE_BYTES,
        )
    }
}
