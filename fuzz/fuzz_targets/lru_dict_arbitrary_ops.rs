#![no_main]

use libfuzzer_sys::fuzz_target;
use lrudict::LruDict;

// Fuzz arbitrary operation sequences on LruDict
//
// Mixes sized and unsized writes, lookups, removals, resizes, and clears
// over a small key space, checking the structural invariants after each step.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let capacity = usize::from(data[0] % 32) + 1;
    let Ok(mut cache) = LruDict::<u8, u32>::new(capacity) else {
        return;
    };

    let mut idx = 1;
    while idx + 2 < data.len() {
        let op = data[idx] % 9;
        let key = data[idx + 1] % 24;
        let arg = data[idx + 2];

        match op {
            0 => {
                // sized set
                let size = usize::from(arg % 40);
                let admitted = size <= cache.capacity();
                let memory_before = cache.memory();
                cache.set(key, u32::from(arg), size).unwrap();

                if admitted {
                    assert_eq!(cache.peek_first().map(|(k, _)| *k), Some(key));
                    assert!(cache.memory() <= cache.capacity());
                } else {
                    // A count-mode shrink may have left memory above capacity.
                    assert_eq!(cache.memory(), memory_before);
                }
            },
            1 => {
                // unsized insert
                cache.insert(key, u32::from(arg)).unwrap();
                assert_eq!(cache.peek_first().map(|(k, _)| *k), Some(key));
            },
            2 => {
                // get
                let present = cache.contains(&key);
                let stats = cache.stats();
                let found = cache.get(&key).is_some();
                assert_eq!(present, found);
                assert_eq!(cache.stats().lookups(), stats.lookups() + 1);
                if found {
                    assert_eq!(cache.recency_rank(&key), Some(0));
                }
            },
            3 => {
                // remove
                let old_len = cache.len();
                if cache.remove(&key).is_some() {
                    assert_eq!(cache.len(), old_len - 1);
                    assert!(!cache.contains(&key));
                }
            },
            4 => {
                // resize
                let new_capacity = usize::from(arg % 32) + 1;
                cache.resize(new_capacity).unwrap();
                assert!(cache.len() <= new_capacity);
            },
            5 => {
                // touch
                if cache.touch(&key) {
                    assert_eq!(cache.peek_first().map(|(k, _)| *k), Some(key));
                }
            },
            6 => {
                // pop_lru
                let tail = cache.peek_last().map(|(k, _)| *k);
                assert_eq!(cache.pop_lru().map(|(k, _)| k), tail);
            },
            7 => {
                // read-only views agree
                assert_eq!(cache.keys().len(), cache.len());
                assert_eq!(cache.values().len(), cache.len());
                assert_eq!(cache.iter().next().map(|(k, _)| k), cache.peek_first().map(|(k, _)| k));
            },
            8 => {
                // clear
                let evictions = cache.stats().evictions;
                cache.clear();
                assert!(cache.is_empty());
                assert_eq!(cache.memory(), 0);
                assert_eq!(cache.stats().evictions, evictions);
            },
            _ => unreachable!(),
        }

        if let Err(err) = cache.check_invariants() {
            panic!("{err}");
        }

        idx += 3;
    }
});
