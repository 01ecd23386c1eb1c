use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use poolru::{CacheBuilder, LruCache};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn filled(limit: usize) -> LruCache<u64, u64> {
    let mut cache = LruCache::new(limit);
    for i in 0..limit as u64 {
        cache.insert(i, i, false);
    }
    cache
}

fn bench_lru_insert_get(c: &mut Criterion) {
    c.bench_function("lru_insert_get", |b| {
        b.iter_batched(
            || filled(1024),
            |mut cache| {
                for i in 0..1024u64 {
                    cache.insert(std::hint::black_box(i + 10_000), i, false);
                    let _ = std::hint::black_box(cache.get(&std::hint::black_box(i)));
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_lru_eviction_churn(c: &mut Criterion) {
    c.bench_function("lru_eviction_churn", |b| {
        b.iter_batched(
            || filled(1024),
            |mut cache| {
                for i in 0..4096u64 {
                    cache.insert(std::hint::black_box(10_000 + i), i, false);
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_lru_get_hotset(c: &mut Criterion) {
    c.bench_function("lru_get_hotset", |b| {
        b.iter_batched(
            || filled(4096),
            |mut cache| {
                for i in 0..4096u64 {
                    let _ = std::hint::black_box(cache.get(&std::hint::black_box(i)));
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_lru_peek(c: &mut Criterion) {
    let cache = filled(4096);
    c.bench_function("lru_peek", |b| {
        b.iter(|| {
            for i in 0..4096u64 {
                let _ = std::hint::black_box(cache.peek(&std::hint::black_box(i)));
            }
        })
    });
}

fn bench_lru_get_or_insert_memo(c: &mut Criterion) {
    c.bench_function("lru_get_or_insert_memo", |b| {
        b.iter_batched(
            || CacheBuilder::new(256).block_size(64).build::<u64, u64>(),
            |mut cache| {
                for i in 0..4096u64 {
                    let key = std::hint::black_box(i % 512);
                    let _ = std::hint::black_box(cache.get_or_insert(key, key * 2));
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_lru_random_mixed(c: &mut Criterion) {
    let universe = 8192u64;
    let mut rng = StdRng::seed_from_u64(42);
    let keys: Vec<u64> = (0..4096).map(|_| rng.random::<u64>() % universe).collect();

    c.bench_function("lru_random_mixed", |b| {
        b.iter_batched(
            || filled(2048),
            |mut cache| {
                for &key in &keys {
                    if cache.get(&std::hint::black_box(key)).is_none() {
                        cache.insert(key, key, false);
                    }
                }
                cache
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_lru_insert_get,
    bench_lru_eviction_churn,
    bench_lru_get_hotset,
    bench_lru_peek,
    bench_lru_get_or_insert_memo,
    bench_lru_random_mixed
);
criterion_main!(benches);
