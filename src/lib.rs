//! poolru: a bounded, single-threaded LRU cache whose storage lives in block
//! pools, so that once full it evicts by rewriting entries in place and
//! performs no heap allocation in steady state.
//!
//! ## Modules
//!
//! - [`ds`]: the slot [`Pool`](ds::Pool) and the pool-backed
//!   [`RecencyList`](ds::RecencyList).
//! - [`policy::lru`]: [`LruCache`], the hash index plus recency list.
//! - [`traits`]: [`ReadOnlyCache`](traits::ReadOnlyCache) and
//!   [`CoreCache`](traits::CoreCache).
//! - [`builder`]: [`CacheBuilder`].
//! - [`error`]: configuration, allocation and invariant errors.
//! - `metrics` (feature `metrics`): hit/miss/eviction counters.
//!
//! ## Example
//!
//! ```
//! use poolru::LruCache;
//!
//! let mut cache = LruCache::new(2);
//! cache.insert("a", 1, false);
//! cache.insert("b", 2, false);
//! cache.get(&"a");
//! cache.insert("c", 3, false);
//!
//! assert!(cache.contains(&"a"));
//! assert!(!cache.contains(&"b"));
//! ```

pub mod builder;
pub mod ds;
pub mod error;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod policy;
pub mod prelude;
pub mod traits;

pub use builder::CacheBuilder;
pub use error::{AllocError, ConfigError, InvariantError};
pub use policy::lru::LruCache;
