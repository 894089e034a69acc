//! Example walking through both capacity modes of LruDict.
//!
//! Run with: cargo run --example basic_lru_dict

use lrudict::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== LruDict Examples ===\n");

    // Example 1: size mode
    println!("1. Size mode (capacity = 10 bytes)");
    let mut blobs = LruDictBuilder::<&str, Vec<u8>>::new(10)
        .on_evict(|key: &&str, value: &Vec<u8>| {
            println!("   evicted {key} ({} bytes)", value.len());
            Ok(())
        })
        .build()?;

    for name in ["a", "b", "c"] {
        let blob = vec![0u8; 4];
        let size = blob.len();
        blobs.set(name, blob, size)?;
    }
    println!("   keys   = {:?}", blobs.keys().collect::<Vec<_>>());
    println!("   memory = {} / {}", blobs.memory(), blobs.capacity());

    // Too large to ever fit: ignored.
    blobs.set("huge", vec![0u8; 11], 11)?;
    println!("   contains huge? {}", blobs.contains("huge"));
    println!();

    // Example 2: count mode
    println!("2. Count mode (unsized inserts, bounded by resize)");
    let mut names: LruDict<u32, String> = LruDict::new(3)?;
    for i in 0..5 {
        names.insert(i, format!("item-{i}"))?;
    }
    println!("   len before resize = {}", names.len());
    names.resize(3)?;
    println!("   keys after resize = {:?}", names.keys().collect::<Vec<_>>());
    println!();

    // Example 3: stats
    println!("3. Stats");
    names.get(&4);
    names.get(&0);
    let stats = names.stats();
    println!(
        "   hits = {}, misses = {}, evictions = {}, hit rate = {:.1}%",
        stats.hits,
        stats.misses,
        stats.evictions,
        stats.hit_rate()
    );
    if let Some((key, value)) = names.peek_last() {
        println!("   next victim: {key} => {value}");
    }

    Ok(())
}
