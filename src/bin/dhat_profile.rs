//! DHAT heap profiler for poolru.
//!
//! Run with: cargo run --bin dhat_profile --release --features dhat-heap
//! View results: Open dhat-heap.json in <https://nnethercote.github.io/dh_view/dh_view.html>

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use poolru::ds::{Pool, PoolConfig};
use poolru::traits::CoreCache;
use poolru::{CacheBuilder, LruCache};

/// Simple XorShift64 RNG for deterministic workloads.
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    fn next_f64(&mut self) -> f64 {
        const SCALE: f64 = 1.0 / (u64::MAX as f64);
        (self.next_u64() as f64) * SCALE
    }
}

/// Run a hotset workload: 90% of accesses hit 10% of keys.
fn hotset_workload<C: CoreCache<u64, u64>>(
    cache: &mut C,
    operations: usize,
    universe: u64,
    seed: u64,
) {
    let mut rng = XorShift64::new(seed);
    let hot_size = (universe as f64 * 0.1) as u64;

    for _ in 0..operations {
        let key = if rng.next_f64() < 0.9 {
            rng.next_u64() % hot_size
        } else {
            hot_size + (rng.next_u64() % (universe - hot_size))
        };

        if cache.get(&key).is_none() {
            cache.insert(key, key, false);
        }
    }
}

/// Run a scan workload: sequential access pattern.
fn scan_workload<C: CoreCache<u64, u64>>(cache: &mut C, operations: usize, universe: u64) {
    for i in 0..operations {
        let key = (i as u64) % universe;
        cache.get_or_insert(key, key);
    }
}

/// Run eviction churn: insert more distinct keys than the limit.
fn eviction_churn<C: CoreCache<u64, u64>>(cache: &mut C, start: u64, operations: usize) {
    for i in 0..operations as u64 {
        cache.insert(start + i, i, false);
    }
}

fn report(phase: &str) {
    let stats = dhat::HeapStats::get();
    println!(
        "  {phase:<12} total_blocks={:>8} total_bytes={:>10} curr_bytes={:>10}",
        stats.total_blocks, stats.total_bytes, stats.curr_bytes
    );
}

fn profile_lru() {
    println!("=== Profiling LRU ===");
    let limit = 4096;
    let operations = 100_000;
    let universe = 16_384;

    let mut cache = LruCache::new(limit);

    for i in 0..limit as u64 {
        cache.insert(i, i, false);
    }
    report("fill");

    // first evictions may still rehash the index once
    eviction_churn(&mut cache, universe, limit);
    report("warm-up");

    hotset_workload(&mut cache, operations, universe, 42);
    report("hotset");

    scan_workload(&mut cache, operations / 2, universe);
    report("scan");

    eviction_churn(&mut cache, 2 * universe, operations / 4);
    report("churn");

    println!("  Final size: {}", cache.len());
}

fn profile_small_blocks() {
    println!("=== Profiling LRU (block_size = 64) ===");
    let limit = 4096;
    let mut cache = CacheBuilder::new(limit).block_size(64).build::<u64, u64>();

    for i in 0..limit as u64 {
        cache.insert(i, i, false);
    }
    report("fill");
    println!("  Pool: {:?}", cache.pool_stats());

    eviction_churn(&mut cache, limit as u64, 50_000);
    report("churn");
}

fn profile_pool() {
    println!("=== Profiling Pool ===");
    let mut pool: Pool<[u64; 4]> = Pool::with_config(PoolConfig::with_block_size(256));
    let mut ids = Vec::with_capacity(1024);

    for i in 0..1024u64 {
        let id = pool.allocate();
        pool.construct(id, [i; 4]);
        ids.push(id);
    }
    report("fill");

    // free list recycling, no new blocks
    for round in 0..100u64 {
        for &id in &ids {
            pool.destroy(id);
            pool.deallocate(id);
        }
        for id in ids.iter_mut() {
            *id = pool.allocate();
            pool.construct(*id, [round; 4]);
        }
    }
    report("recycle");
    println!("  Pool: {:?}", pool.stats());
}

fn main() {
    let _profiler = dhat::Profiler::new_heap();

    profile_lru();
    profile_small_blocks();
    profile_pool();

    println!("\nProfile written to dhat-heap.json");
}
