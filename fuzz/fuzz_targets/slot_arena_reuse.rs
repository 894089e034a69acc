#![no_main]

use libfuzzer_sys::fuzz_target;
use lrudict::ds::{SlotArena, SlotId};

// Fuzz insert/remove interleavings on SlotArena
//
// A freed slot must be the next one handed out, live handles must keep
// reading their own value, and stale handles must read nothing.
fuzz_target!(|data: &[u8]| {
    let mut arena: SlotArena<u32> = SlotArena::new();
    let mut live: Vec<(SlotId, u32)> = Vec::new();
    let mut last_freed: Option<SlotId> = None;

    for (step, byte) in data.iter().enumerate() {
        let value = u32::from(*byte) | ((step as u32) << 8);

        if byte % 3 == 0 && !live.is_empty() {
            let (id, expected) = live.swap_remove(usize::from(*byte) % live.len());
            assert_eq!(arena.remove(id), Some(expected));
            assert!(!arena.contains(id));
            assert_eq!(arena.remove(id), None);
            last_freed = Some(id);
        } else {
            let id = arena.insert(value);
            if let Some(freed) = last_freed.take() {
                assert_eq!(id, freed);
            }
            live.push((id, value));
        }

        assert_eq!(arena.len(), live.len());
        for (id, expected) in &live {
            assert_eq!(arena.get(*id), Some(expected));
        }
    }

    arena.clear();
    assert!(arena.is_empty());
});
