//! # Metrics Trait Hierarchy
//!
//! Recording, snapshotting and resetting are split into small traits so the
//! cache only writes counters and callers only read snapshots.
//!
//! ```text
//!   ┌─────────────────────────────┐      ┌─────────────────────────────┐
//!   │     CoreMetricsRecorder     │      │   LruMetricsReadRecorder    │
//!   │  get_hit/get_miss/insert    │      │  peek (via &self, Cell)     │
//!   │  evict                      │      │                             │
//!   └──────────────┬──────────────┘      └──────────────┬──────────────┘
//!                  │                                    │
//!                  └──────────────┬─────────────────────┘
//!                                 ▼
//!                           ┌──────────┐
//!                           │LruMetrics│
//!                           └────┬─────┘
//!                                │
//!   Consumption:                 ▼
//!   ┌──────────────────────────────┐    ┌──────────────────────────────┐
//!   │ MetricsSnapshotProvider<S>   │    │ MetricsReset                 │
//!   │ (bench/test)                 │    │ (between bench iterations)   │
//!   └──────────────────────────────┘    └──────────────────────────────┘
//! ```

/// Common counters for the cache's mutating paths.
pub trait CoreMetricsRecorder {
    fn record_get_hit(&mut self);
    fn record_get_miss(&mut self);
    fn record_insert_call(&mut self);
    fn record_insert_new(&mut self);
    fn record_insert_update(&mut self);
    fn record_evicted_entry(&mut self);
}

/// Read-only LRU metrics for &self methods (uses interior mutability).
pub trait LruMetricsReadRecorder {
    fn record_peek_call(&self);
    fn record_peek_found(&self);
}

/// Produces a point-in-time copy of the counters plus gauges.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Reset metrics between tests or benchmark iterations.
pub trait MetricsReset {
    fn reset_metrics(&mut self);
}
