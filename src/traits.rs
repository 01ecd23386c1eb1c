//! # Cache Traits
//!
//! Small trait pair that lets callers be written against "a bounded cache"
//! instead of a concrete type.
//!
//! ```text
//!   ┌─────────────────────────────────────────┐
//!   │          ReadOnlyCache<K, V>            │
//!   │                                         │
//!   │  contains(&, &K) → bool                 │
//!   │  len(&) → usize                         │
//!   │  is_empty(&) → bool                     │
//!   │  limit(&) → usize                       │
//!   │  peek(&, &K) → Option<&V>               │
//!   └──────────────────┬──────────────────────┘
//!                      │
//!                      ▼
//!   ┌─────────────────────────────────────────┐
//!   │            CoreCache<K, V>              │
//!   │                                         │
//!   │  insert(&mut, K, V, bool)               │
//!   │      → (&mut V, bool)                   │
//!   │  get(&mut, &K) → Option<&V>             │
//!   │  get_or_insert(&mut, K, V) → &mut V     │
//!   └─────────────────────────────────────────┘
//! ```
//!
//! `ReadOnlyCache` methods never change eviction order. `CoreCache` methods
//! may: every successful lookup or insert counts as an access.
//!
//! ## Example Usage
//!
//! ```
//! use poolru::traits::CoreCache;
//! use poolru::LruCache;
//!
//! fn memo_square<C: CoreCache<u64, u64>>(cache: &mut C, n: u64) -> u64 {
//!     if let Some(v) = cache.get(&n) {
//!         return *v;
//!     }
//!     *cache.get_or_insert(n, n * n)
//! }
//!
//! let mut cache = LruCache::new(4);
//! assert_eq!(memo_square(&mut cache, 12), 144);
//! assert_eq!(memo_square(&mut cache, 12), 144);
//! assert_eq!(cache.len(), 1);
//! ```

/// Operations that observe a cache without affecting its eviction order.
pub trait ReadOnlyCache<K, V> {
    /// Checks if a key exists without updating access state.
    fn contains(&self, key: &K) -> bool;

    /// Returns the current number of entries in the cache.
    fn len(&self) -> usize;

    /// Returns `true` if the cache contains no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the maximum number of entries the cache holds.
    fn limit(&self) -> usize;

    /// Returns the value for `key` without updating access state.
    fn peek(&self, key: &K) -> Option<&V>;
}

/// Core operations of a bounded cache.
///
/// # Example
///
/// ```
/// use poolru::traits::{CoreCache, ReadOnlyCache};
/// use poolru::LruCache;
///
/// fn warm<C: CoreCache<u32, &'static str>>(cache: &mut C, data: &[(u32, &'static str)]) {
///     for &(k, v) in data {
///         cache.insert(k, v, true);
///     }
/// }
///
/// let mut cache = LruCache::new(2);
/// warm(&mut cache, &[(1, "one"), (2, "two"), (3, "three")]);
/// assert_eq!(ReadOnlyCache::len(&cache), 2);
/// assert!(!ReadOnlyCache::contains(&cache, &1));
/// ```
pub trait CoreCache<K, V>: ReadOnlyCache<K, V> {
    /// Inserts a key-value pair.
    ///
    /// Returns the stored value and `true` if a new entry was created. For an
    /// existing key the stored value is replaced only when `update` is set.
    /// If the cache is full, the least recently used entry makes room.
    fn insert(&mut self, key: K, value: V, update: bool) -> (&mut V, bool);

    /// Gets a reference to a value by key, marking it as recently used.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Returns the cached value for `key`, inserting `value` if absent.
    fn get_or_insert(&mut self, key: K, value: V) -> &mut V {
        self.insert(key, value, false).0
    }
}
