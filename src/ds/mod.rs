pub mod pool;
pub mod recency_list;

pub use pool::{Pool, PoolConfig, PoolStats, SlotId, DEFAULT_BLOCK_SIZE};
pub use recency_list::RecencyList;
