#![no_main]

use libfuzzer_sys::fuzz_target;
use poolru::ds::{Pool, PoolConfig};

// Fuzz arbitrary operation sequences on Pool
//
// The first byte picks block size and reuse policy; then pairs of
// (op, value) bytes drive allocate, construct, destroy and deallocate.
fuzz_target!(|data: &[u8]| {
    let Some((&header, ops)) = data.split_first() else {
        return;
    };

    let config = PoolConfig {
        initial_block: usize::from(header >> 4),
        block_size: usize::from(header & 0x07) + 1,
        reuse_freed: header & 0x08 != 0,
    };
    let mut pool: Pool<u32> = Pool::with_config(config);
    let mut allocated = Vec::new();
    let mut live = 0usize;

    for pair in ops.chunks_exact(2) {
        let op = pair[0] % 5;
        let value = u32::from(pair[1]);

        match op {
            0 => {
                // allocate + construct
                let free_before = pool.free_len();
                let blocks_before = pool.block_count();
                let id = pool.allocate();
                if config.reuse_freed && free_before > 0 {
                    assert_eq!(pool.block_count(), blocks_before);
                }
                pool.construct(id, value);
                assert_eq!(pool.get(id), Some(&value));
                allocated.push(id);
                live += 1;
            }
            1 => {
                // deallocate
                if !allocated.is_empty() {
                    let id = allocated.swap_remove(usize::from(pair[1]) % allocated.len());
                    pool.deallocate(id);
                    assert!(!pool.contains(id));
                    live -= 1;
                }
            }
            2 => {
                // destroy keeps the slot allocated
                if !allocated.is_empty() {
                    let id = allocated[usize::from(pair[1]) % allocated.len()];
                    pool.destroy(id);
                    assert!(!pool.contains(id));
                }
            }
            3 => {
                // overwrite
                if let Some(&id) = allocated.last() {
                    if pool.contains(id) {
                        pool[id] = value;
                        assert_eq!(pool[id], value);
                    }
                }
            }
            4 => {
                let stats = pool.stats();
                assert!(stats.live + stats.free <= stats.capacity);
            }
            _ => unreachable!(),
        }

        assert_eq!(pool.live(), live);
    }
});
