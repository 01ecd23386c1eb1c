//! Builder for [`LruCache`].
//!
//! Collects the sizing knobs (limit, initial capacity hint, pool block size)
//! in one place so callers do not have to pick among the constructors.
//!
//! ## Example
//!
//! ```rust
//! use poolru::builder::CacheBuilder;
//!
//! let mut cache = CacheBuilder::new(100)
//!     .initial_capacity(16)
//!     .build::<u64, String>();
//! cache.insert(1, "hello".to_string(), false);
//! assert_eq!(cache.get(&1), Some(&"hello".to_string()));
//! ```

use std::hash::{BuildHasher, Hash};

use rustc_hash::FxBuildHasher;

use crate::ds::pool::DEFAULT_BLOCK_SIZE;
use crate::error::ConfigError;
use crate::policy::lru::LruCache;

/// Builder for creating caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheBuilder {
    limit: usize,
    initial_capacity: usize,
    block_size: usize,
}

impl CacheBuilder {
    /// Create a new builder for a cache holding at most `limit` entries.
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            initial_capacity: 0,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }

    /// Pre-size storage for `n` entries. `0` (the default) sizes the first
    /// pool block as `min(limit, block_size)`.
    pub fn initial_capacity(mut self, n: usize) -> Self {
        self.initial_capacity = n;
        self
    }

    /// Number of slots in each pool block after the first.
    pub fn block_size(mut self, n: usize) -> Self {
        self.block_size = n;
        self
    }

    /// Build the cache.
    ///
    /// # Panics
    ///
    /// Panics if `limit` or `block_size` is zero.
    pub fn build<K, V>(self) -> LruCache<K, V>
    where
        K: Eq + Hash,
    {
        self.build_with_hasher(FxBuildHasher)
    }

    /// Build the cache, reporting invalid settings as [`ConfigError`].
    pub fn try_build<K, V>(self) -> Result<LruCache<K, V>, ConfigError>
    where
        K: Eq + Hash,
    {
        self.try_build_with_hasher(FxBuildHasher)
    }

    /// Build the cache with a caller-supplied hasher.
    ///
    /// # Panics
    ///
    /// Panics if `limit` or `block_size` is zero.
    pub fn build_with_hasher<K, V, S>(self, hasher: S) -> LruCache<K, V, S>
    where
        K: Eq + Hash,
        S: BuildHasher,
    {
        match self.try_build_with_hasher(hasher) {
            Ok(cache) => cache,
            Err(err) => panic!("{err}"),
        }
    }

    /// Fallible counterpart of [`CacheBuilder::build_with_hasher`].
    pub fn try_build_with_hasher<K, V, S>(self, hasher: S) -> Result<LruCache<K, V, S>, ConfigError>
    where
        K: Eq + Hash,
        S: BuildHasher,
    {
        LruCache::from_parts(self.limit, self.initial_capacity, self.block_size, hasher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::RandomState;

    #[test]
    fn test_builder_defaults() {
        let cache = CacheBuilder::new(10).build::<u64, u64>();
        assert_eq!(cache.limit(), 10);
        assert!(cache.is_empty());
        assert_eq!(cache.pool_stats().growth_target, 10);
    }

    #[test]
    fn test_builder_block_size_controls_growth() {
        let mut cache = CacheBuilder::new(10).block_size(4).build::<u64, u64>();
        for i in 0..10 {
            cache.insert(i, i, false);
        }
        // first block min(10, 4) = 4, then 4 + 4
        assert_eq!(cache.pool_stats().blocks, 3);
        assert_eq!(cache.pool_stats().capacity, 12);
    }

    #[test]
    fn test_builder_initial_capacity_sizes_first_block() {
        let mut cache = CacheBuilder::new(100)
            .initial_capacity(32)
            .block_size(8)
            .build::<u64, u64>();
        cache.insert(1, 1, false);
        assert_eq!(cache.pool_stats().blocks, 1);
        assert_eq!(cache.pool_stats().capacity, 32);
    }

    #[test]
    fn test_builder_rejects_zero_limit() {
        let err = CacheBuilder::new(0).try_build::<u64, u64>().unwrap_err();
        assert!(err.message().contains("limit"));
    }

    #[test]
    fn test_builder_rejects_zero_block_size() {
        let err = CacheBuilder::new(4)
            .block_size(0)
            .try_build::<u64, u64>()
            .unwrap_err();
        assert!(err.message().contains("block_size"));
    }

    #[test]
    #[should_panic(expected = "limit")]
    fn test_builder_build_panics_on_zero_limit() {
        let _ = CacheBuilder::new(0).build::<u64, u64>();
    }

    #[test]
    fn test_builder_custom_hasher() {
        let mut cache = CacheBuilder::new(2).build_with_hasher::<&str, i32, _>(RandomState::new());
        cache.insert("a", 1, false);
        cache.insert("b", 2, false);
        cache.insert("c", 3, false);
        assert!(!cache.contains("a"));
        assert_eq!(cache.peek("c"), Some(&3));
    }
}
