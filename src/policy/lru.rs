//! # Least Recently Used (LRU) Cache Implementation
//!
//! A bounded, single-threaded LRU cache whose storage is carved out of block
//! [`Pool`]s. Once the cache holds `limit` entries, inserting a new key
//! reuses the least recently used entry's key slot and list node in place,
//! so steady-state operation performs no heap allocation.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                          LruCache<K, V, S>                           │
//!   │                                                                      │
//!   │   index: HashTable<SlotId>          keys: Pool<IndexEntry<K>>        │
//!   │   ┌───────────────┐                 ┌──────┬──────────────────────┐  │
//!   │   │ hash → k_slot │ ──────────────► │ k_0  │ { key: "a", node: n_0 } │
//!   │   │ hash → k_slot │ ──────────────► │ k_1  │ { key: "b", node: n_1 } │
//!   │   └───────────────┘                 └──────┴───────────┬──────────┘  │
//!   │                                          ▲             │             │
//!   │                              back-ref    │             ▼             │
//!   │   list: RecencyList<ListEntry<V>>        │                           │
//!   │   head ─► [n_0 { key: k_0, value }] ◄──► [n_1 { key: k_1, value }]   │
//!   │           (LRU)                                       (MRU) ◄── tail │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The key is stored once, in the index's key slot. The list node holds the
//! value and a `SlotId` back-reference to that key slot; the key slot holds
//! the node's `SlotId`. Both pools are configured without free-list reuse:
//! the cache never releases a slot before it is dropped.
//!
//! ## Operations Flow
//!
//! ```text
//!   INSERT new key (cache full, limit = 3)
//!   ═══════════════════════════════════════════════════════════════════════
//!
//!   Before:  head ──► [A] ◄──► [B] ◄──► [C] ◄── tail
//!                     LRU                MRU
//!
//!   insert(D):
//!     1. Follow [A]'s back-reference to its key slot
//!     2. Detach that key slot from the index
//!     3. Overwrite key A with D, overwrite [A]'s value
//!     4. Reinsert the key slot under hash(D)
//!     5. Splice the node to the tail
//!
//!   After:   head ──► [B] ◄──► [C] ◄──► [D] ◄── tail     (no allocation)
//!
//!   ═══════════════════════════════════════════════════════════════════════
//!
//!   get(B) splices [B] to the tail; peek(B) leaves the order untouched.
//! ```
//!
//! ## Methods
//!
//! | Method                 | Complexity | Description                              |
//! |------------------------|------------|------------------------------------------|
//! | `new(limit)`           | O(1)       | Create cache; panics if `limit == 0`     |
//! | `insert(k, v, update)` | O(1)*      | Insert, promote, or replace LRU in place |
//! | `get_or_insert(k, v)`  | O(1)*      | `insert(k, v, false)`, value only        |
//! | `get(&k)`              | O(1)       | Observe and promote to MRU               |
//! | `peek(&k)`             | O(1)       | Observe without promoting                |
//! | `for_each(f)`          | O(n)       | Visit entries LRU → MRU                  |
//! | `check_invariants()`   | O(n)       | Verify index/list/key-slot agreement     |
//!
//! `*` amortized: allocation happens only while the cache grows towards
//! `limit` (pool blocks, index buckets).
//!
//! ## Thread Safety
//!
//! Not thread-safe. Callers sharing a cache must serialize access
//! themselves.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, Hash};

use hashbrown::HashTable;
use rustc_hash::FxBuildHasher;

use crate::ds::pool::{Pool, PoolConfig, PoolStats, SlotId, DEFAULT_BLOCK_SIZE};
use crate::ds::recency_list::{RecencyList, RecencyListIter};
use crate::error::{ConfigError, InvariantError};
use crate::traits::{CoreCache, ReadOnlyCache};

#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::LruMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::LruMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    CoreMetricsRecorder, LruMetricsReadRecorder, MetricsReset, MetricsSnapshotProvider,
};

/// Key storage owned by the index.
#[derive(Debug)]
struct IndexEntry<K> {
    key: K,
    node: SlotId,
}

/// Recency-list payload: the value plus a back-reference to its key slot.
#[derive(Debug)]
struct ListEntry<V> {
    key: SlotId,
    value: V,
}

/// Bounded LRU cache with in-place eviction.
///
/// # Example
///
/// ```
/// use poolru::LruCache;
///
/// let mut cache = LruCache::new(3);
/// cache.insert(1, "a", false);
/// cache.insert(2, "b", false);
/// cache.insert(3, "c", false);
///
/// // Promote 1; 2 becomes the least recently used entry.
/// assert_eq!(cache.get(&1), Some(&"a"));
///
/// cache.insert(4, "d", false);
/// assert!(!cache.contains(&2));
///
/// let order: Vec<_> = cache.iter().map(|(k, _)| *k).collect();
/// assert_eq!(order, vec![3, 1, 4]);
/// ```
pub struct LruCache<K, V, S = FxBuildHasher> {
    index: HashTable<SlotId>,
    keys: Pool<IndexEntry<K>>,
    list: RecencyList<ListEntry<V>>,
    hasher: S,
    limit: usize,
    #[cfg(feature = "metrics")]
    metrics: LruMetrics,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash,
{
    /// Creates an empty cache holding at most `limit` entries.
    ///
    /// # Panics
    ///
    /// Panics if `limit` is zero.
    pub fn new(limit: usize) -> Self {
        Self::with_capacity(limit, 0)
    }

    /// Creates an empty cache and pre-sizes storage for `initial_capacity`
    /// entries. The hint is independent of `limit`.
    ///
    /// # Panics
    ///
    /// Panics if `limit` is zero.
    pub fn with_capacity(limit: usize, initial_capacity: usize) -> Self {
        Self::with_hasher(limit, initial_capacity, FxBuildHasher)
    }

    /// Fallible counterpart of [`LruCache::new`].
    ///
    /// # Example
    ///
    /// ```
    /// use poolru::LruCache;
    ///
    /// assert!(LruCache::<u32, u32>::try_new(0).is_err());
    /// assert_eq!(LruCache::<u32, u32>::try_new(8).unwrap().limit(), 8);
    /// ```
    pub fn try_new(limit: usize) -> Result<Self, ConfigError> {
        Self::try_with_capacity(limit, 0)
    }

    /// Fallible counterpart of [`LruCache::with_capacity`].
    pub fn try_with_capacity(limit: usize, initial_capacity: usize) -> Result<Self, ConfigError> {
        Self::try_with_hasher(limit, initial_capacity, FxBuildHasher)
    }
}

impl<K, V, S> LruCache<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Creates an empty cache using `hasher` for the index.
    ///
    /// # Panics
    ///
    /// Panics if `limit` is zero.
    pub fn with_hasher(limit: usize, initial_capacity: usize, hasher: S) -> Self {
        match Self::try_with_hasher(limit, initial_capacity, hasher) {
            Ok(cache) => cache,
            Err(err) => panic!("{err}"),
        }
    }

    /// Fallible counterpart of [`LruCache::with_hasher`].
    pub fn try_with_hasher(
        limit: usize,
        initial_capacity: usize,
        hasher: S,
    ) -> Result<Self, ConfigError> {
        Self::from_parts(limit, initial_capacity, DEFAULT_BLOCK_SIZE, hasher)
    }

    pub(crate) fn from_parts(
        limit: usize,
        initial_capacity: usize,
        block_size: usize,
        hasher: S,
    ) -> Result<Self, ConfigError> {
        if limit == 0 {
            return Err(ConfigError::new("cache limit must be > 0"));
        }
        let initial_block = if initial_capacity == 0 {
            limit.min(block_size)
        } else {
            initial_capacity
        };
        let config = PoolConfig {
            initial_block,
            block_size,
            reuse_freed: false,
        };
        config.validate()?;

        #[cfg(feature = "tracing")]
        tracing::debug!(limit, initial_block, block_size, "creating lru cache");

        Ok(Self {
            index: HashTable::with_capacity(initial_capacity),
            keys: Pool::with_config(config),
            list: RecencyList::with_config(config),
            hasher,
            limit,
            #[cfg(feature = "metrics")]
            metrics: LruMetrics::default(),
        })
    }

    /// Returns the number of entries in the cache.
    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if the cache is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns the maximum number of entries.
    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns `true` if the key is cached. Does not update LRU order.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.node_of(key).is_some()
    }

    /// Inserts `(key, value)` and returns the stored value plus whether a
    /// new entry was created.
    ///
    /// - Key present: the entry moves to the MRU end; its value is replaced
    ///   only if `update` is `true`. Returns `(value, false)`.
    /// - Key absent, below `limit`: a new entry is appended at the MRU end.
    /// - Key absent, at `limit`: the LRU entry's slots are rewritten in
    ///   place with the new key and value and moved to the MRU end.
    ///
    /// # Example
    ///
    /// ```
    /// use poolru::LruCache;
    ///
    /// let mut cache = LruCache::new(2);
    /// assert_eq!(cache.insert(1, "a", false), (&mut "a", true));
    /// assert_eq!(cache.insert(1, "b", false), (&mut "a", false));
    /// assert_eq!(cache.insert(1, "c", true), (&mut "c", false));
    /// ```
    pub fn insert(&mut self, key: K, value: V, update: bool) -> (&mut V, bool) {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        let hash = self.hasher.hash_one(&key);
        if let Some(slot) = self.find_slot(hash, &key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();

            let node = self.keys[slot].node;
            self.list.move_to_back(node);
            let stored = &mut self.list[node].value;
            if update {
                *stored = value;
            }
            return (stored, false);
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();

        let stored = match self.list.front_id() {
            Some(lru) if self.len() >= self.limit => self.replace_lru(lru, hash, key, value),
            _ => self.push_new(hash, key, value),
        };
        (stored, true)
    }

    /// Returns the cached value for `key`, inserting `value` first if the
    /// key is absent. An existing value is never overwritten.
    pub fn get_or_insert(&mut self, key: K, value: V) -> &mut V {
        self.insert(key, value, false).0
    }

    /// Observes and promotes: returns the value for `key` and moves the
    /// entry to the MRU end.
    ///
    /// Promotion is a mutation of recency state, hence `&mut self`.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get_mut(key).map(|value| &*value)
    }

    /// Mutable variant of [`LruCache::get`]; also promotes the entry.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let Some(node) = self.node_of(key) else {
            #[cfg(feature = "metrics")]
            self.metrics.record_get_miss();
            return None;
        };

        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();

        self.list.move_to_back(node);
        Some(&mut self.list[node].value)
    }

    /// Returns the value for `key` without touching LRU order.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_peek_call();

        let node = self.node_of(key)?;

        #[cfg(feature = "metrics")]
        (&self.metrics).record_peek_found();

        self.list.get(node).map(|entry| &entry.value)
    }

    /// Mutable variant of [`LruCache::peek`]; does not touch LRU order.
    pub fn peek_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_peek_call();

        let node = self.node_of(key)?;

        #[cfg(feature = "metrics")]
        (&self.metrics).record_peek_found();

        self.list.get_mut(node).map(|entry| &mut entry.value)
    }

    /// Calls `f(key, value)` for every entry, least recently used first.
    /// Does not update LRU order.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V),
    {
        for (key, value) in self.iter() {
            f(key, value);
        }
    }

    /// Like [`LruCache::for_each`] with mutable access to the values.
    pub fn for_each_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V),
    {
        let mut current = self.list.front_id();
        while let Some(node) = current {
            current = self.list.next_id(node);
            let entry = &mut self.list[node];
            f(&self.keys[entry.key].key, &mut entry.value);
        }
    }

    /// Returns an iterator over `(&K, &V)` from LRU to MRU.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            keys: &self.keys,
            inner: self.list.iter(),
            remaining: self.len(),
        }
    }

    /// Bookkeeping of the recency-list pool (one slot per entry).
    pub fn pool_stats(&self) -> PoolStats {
        self.list.pool_stats()
    }

    /// Verifies that the index, key slots and recency list agree.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let len = self.index.len();
        if self.list.len() != len {
            return Err(InvariantError::new(format!(
                "index holds {len} entries but recency list holds {}",
                self.list.len()
            )));
        }
        if self.keys.live() != len {
            return Err(InvariantError::new(format!(
                "index holds {len} entries but {} key slots are live",
                self.keys.live()
            )));
        }
        if len > self.limit {
            return Err(InvariantError::new(format!(
                "cache holds {len} entries, limit is {}",
                self.limit
            )));
        }

        let mut visited = 0usize;
        for (node, entry) in self.list.iter_entries() {
            let Some(key_entry) = self.keys.get(entry.key) else {
                return Err(InvariantError::new(format!(
                    "node {} points at empty key slot {}",
                    node.index(),
                    entry.key.index()
                )));
            };
            if key_entry.node != node {
                return Err(InvariantError::new(format!(
                    "key slot {} points at node {}, expected {}",
                    entry.key.index(),
                    key_entry.node.index(),
                    node.index()
                )));
            }
            if self.find_slot(self.hasher.hash_one(&key_entry.key), &key_entry.key)
                != Some(entry.key)
            {
                return Err(InvariantError::new(format!(
                    "key slot {} is not reachable from the index",
                    entry.key.index()
                )));
            }
            visited += 1;
        }
        if visited != len {
            return Err(InvariantError::new(format!(
                "walked {visited} list nodes, expected {len}"
            )));
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        self.list.debug_validate_invariants();
        if let Err(err) = self.check_invariants() {
            panic!("{err}");
        }
    }

    fn node_of<Q>(&self, key: &Q) -> Option<SlotId>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let slot = self.find_slot(self.hasher.hash_one(key), key)?;
        self.keys.get(slot).map(|entry| entry.node)
    }

    fn find_slot<Q>(&self, hash: u64, key: &Q) -> Option<SlotId>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let keys = &self.keys;
        self.index
            .find(hash, |&slot| {
                keys.get(slot)
                    .is_some_and(|entry| entry.key.borrow() == key)
            })
            .copied()
    }

    fn push_new(&mut self, hash: u64, key: K, value: V) -> &mut V {
        // The key slot's id is known before the node exists, so the node is
        // created with its back-reference already in place.
        let slot = self.keys.allocate();
        let node = self.list.push_back(ListEntry { key: slot, value });
        self.keys.construct(slot, IndexEntry { key, node });

        let (index, keys, hasher) = (&mut self.index, &self.keys, &self.hasher);
        index.insert_unique(hash, slot, |&s| hasher.hash_one(&keys[s].key));

        // Headroom so eviction churn rehashes tombstones in place instead
        // of growing the table.
        if index.len() == self.limit {
            index.reserve(self.limit, |&s| hasher.hash_one(&keys[s].key));
        }

        &mut self.list[node].value
    }

    fn replace_lru(&mut self, lru: SlotId, hash: u64, key: K, value: V) -> &mut V {
        let slot = self.list[lru].key;
        let old_hash = self.hasher.hash_one(&self.keys[slot].key);
        if let Ok(entry) = self.index.find_entry(old_hash, |&s| s == slot) {
            entry.remove();
        }

        let key_entry = &mut self.keys[slot];
        debug_assert_eq!(key_entry.node, lru);
        key_entry.key = key;

        let (index, keys, hasher) = (&mut self.index, &self.keys, &self.hasher);
        index.insert_unique(hash, slot, |&s| hasher.hash_one(&keys[s].key));

        self.list.move_to_back(lru);

        #[cfg(feature = "metrics")]
        self.metrics.record_evicted_entry();

        let entry = &mut self.list[lru];
        entry.value = value;
        &mut entry.value
    }
}

#[cfg(feature = "metrics")]
impl<K, V, S> LruCache<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn metrics_snapshot(&self) -> LruMetricsSnapshot {
        let pool = self.list.pool_stats();
        LruMetricsSnapshot {
            get_calls: self.metrics.get_calls,
            get_hits: self.metrics.get_hits,
            get_misses: self.metrics.get_misses,
            insert_calls: self.metrics.insert_calls,
            insert_updates: self.metrics.insert_updates,
            insert_new: self.metrics.insert_new,
            evicted_entries: self.metrics.evicted_entries,
            peek_calls: self.metrics.peek_calls.get(),
            peek_found: self.metrics.peek_found.get(),
            cache_len: self.len(),
            limit: self.limit,
            pool_blocks: pool.blocks,
            pool_capacity: pool.capacity,
        }
    }

    pub fn reset_metrics(&mut self) {
        self.metrics.reset_metrics();
    }
}

#[cfg(feature = "metrics")]
impl<K, V, S> MetricsSnapshotProvider<LruMetricsSnapshot> for LruCache<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn snapshot(&self) -> LruMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V, S> ReadOnlyCache<K, V> for LruCache<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn contains(&self, key: &K) -> bool {
        LruCache::contains(self, key)
    }

    fn len(&self) -> usize {
        LruCache::len(self)
    }

    fn limit(&self) -> usize {
        self.limit
    }

    fn peek(&self, key: &K) -> Option<&V> {
        LruCache::peek(self, key)
    }
}

impl<K, V, S> CoreCache<K, V> for LruCache<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn insert(&mut self, key: K, value: V, update: bool) -> (&mut V, bool) {
        LruCache::insert(self, key, value, update)
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        LruCache::get(self, key)
    }
}

impl<K, V, S> fmt::Debug for LruCache<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys = &self.keys;
        f.debug_map()
            .entries(
                self.list
                    .iter()
                    .map(|entry| (&keys[entry.key].key, &entry.value)),
            )
            .finish()
    }
}

/// Iterator over cache entries from least to most recently used.
pub struct Iter<'a, K, V> {
    keys: &'a Pool<IndexEntry<K>>,
    inner: RecencyListIter<'a, ListEntry<V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.inner.next()?;
        self.remaining = self.remaining.saturating_sub(1);
        let key = &self.keys.get(entry.key)?.key;
        Some((key, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K, V, S> IntoIterator for &'a LruCache<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
