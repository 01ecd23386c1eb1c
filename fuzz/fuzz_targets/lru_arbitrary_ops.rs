#![no_main]

use libfuzzer_sys::fuzz_target;
use poolru::CacheBuilder;

// Fuzz arbitrary operation sequences on LruCache
//
// Tests random sequences of insert (with and without update), get,
// get_or_insert, peek and for_each against a Vec-backed model.
fuzz_target!(|data: &[u8]| {
    let Some((&header, ops)) = data.split_first() else {
        return;
    };

    let limit = usize::from(header % 16) + 1;
    let block_size = usize::from(header >> 4) + 1;
    let mut cache = CacheBuilder::new(limit)
        .block_size(block_size)
        .build::<u8, u8>();
    // model ordered LRU -> MRU
    let mut model: Vec<(u8, u8)> = Vec::new();

    for pair in ops.chunks_exact(2) {
        let op = pair[0] % 5;
        let key = pair[0] >> 3;
        let value = pair[1];

        match op {
            0 | 1 => {
                let update = op == 1;
                let (stored, inserted) = cache.insert(key, value, update);
                let stored = *stored;
                match model.iter().position(|(k, _)| *k == key) {
                    Some(pos) => {
                        let mut entry = model.remove(pos);
                        if update {
                            entry.1 = value;
                        }
                        model.push(entry);
                        assert!(!inserted);
                        assert_eq!(stored, entry.1);
                    }
                    None => {
                        if model.len() == limit {
                            model.remove(0);
                        }
                        model.push((key, value));
                        assert!(inserted);
                        assert_eq!(stored, value);
                    }
                }
            }
            2 => {
                let got = cache.get(&key).copied();
                let expected = model.iter().position(|(k, _)| *k == key).map(|pos| {
                    let entry = model.remove(pos);
                    model.push(entry);
                    entry.1
                });
                assert_eq!(got, expected);
            }
            3 => {
                let expected = model.iter().find(|(k, _)| *k == key).map(|(_, v)| *v);
                assert_eq!(cache.peek(&key).copied(), expected);
            }
            4 => {
                let mut seen = Vec::with_capacity(cache.len());
                cache.for_each(|k, v| seen.push((*k, *v)));
                assert_eq!(seen, model);
            }
            _ => unreachable!(),
        }

        assert!(cache.len() <= limit);
        assert_eq!(cache.len(), model.len());
    }

    assert!(cache.check_invariants().is_ok());
});
