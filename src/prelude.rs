pub use crate::builder::CacheBuilder;
pub use crate::ds::{Pool, PoolConfig, PoolStats, RecencyList, SlotId, DEFAULT_BLOCK_SIZE};
pub use crate::error::{AllocError, ConfigError, InvariantError};
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::LruMetricsSnapshot;
#[cfg(feature = "metrics")]
pub use crate::metrics::traits::MetricsSnapshotProvider;
pub use crate::policy::lru::LruCache;
pub use crate::traits::{CoreCache, ReadOnlyCache};
