//! Memoized Fibonacci over a tiny LRU cache.
//!
//! Run with: cargo run --example fibonacci
//!
//! The recursion only ever needs the two previous results, so a cache of
//! ten entries is enough to keep the naive recursion linear.

use poolru::traits::CoreCache;
use poolru::LruCache;

const N: u64 = 65;

fn fib_memo<C: CoreCache<u64, u64>>(cache: &mut C, n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    if let Some(&v) = cache.get(&n) {
        return v;
    }
    let v = fib_memo(cache, n - 1) + fib_memo(cache, n - 2);
    *cache.get_or_insert(n, v)
}

fn fib_iter(n: u64) -> u64 {
    let (mut a, mut b) = (0u64, 1u64);
    for _ in 0..n {
        let next = a + b;
        a = b;
        b = next;
    }
    a
}

fn main() {
    let mut cache: LruCache<u64, u64> = LruCache::with_capacity(10, 20);

    let memoized = fib_memo(&mut cache, N);
    let expected = fib_iter(N);

    println!("fib({N}) = {memoized}");
    println!("cache holds {} of {} entries", cache.len(), cache.limit());
    cache.for_each(|k, v| println!("  {k:>3} -> {v}"));

    assert_eq!(memoized, expected, "memoized result diverged");
}
