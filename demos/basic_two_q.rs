//! Example demonstrating the 2Q admission protocol.
//!
//! Keys must be seen twice before they earn a frequent slot, so a one-off
//! scan cannot flush hot keys. The cache never fetches values itself: the
//! caller asks `test`, fetches on a miss, and reports back with `observe`.
//!
//! Run with: cargo run --example basic_two_q

use std::collections::HashMap;

use tiny2q::builder::CacheBuilder;
use tiny2q::policy::two_q::Condition;

fn main() {
    println!("=== 2Q Cache Example ===\n");

    // Backing store standing in for slow memory
    let store: HashMap<u64, String> = (0..100).map(|i| (i, format!("value-{}", i))).collect();
    let mut fetches = 0;

    // 8 frequent slots, 2 recent slots
    let mut cache = CacheBuilder::new(8).recent_ratio(4).build::<u64, String>();
    println!(
        "Created 2Q cache: capacity={}, recent_capacity={}\n",
        cache.capacity(),
        cache.recent_capacity()
    );

    let mut lookup = |cache: &mut tiny2q::TwoQCache<u64, String>, key: u64| -> Condition {
        let mut value = String::new();
        let cond = cache.test(&key, &mut value);
        if cond != Condition::Frequent {
            fetches += 1;
            value = store[&key].clone();
            cache.observe(cond, key, value);
        }
        cond
    };

    // First sighting: absent, second: recent (promoted), third: frequent
    for round in 1..=3 {
        let cond = lookup(&mut cache, 1);
        println!("Lookup #{} of key 1 -> {:?}", round, cond);
    }

    // Make keys 2..=8 frequent as well
    for key in 2..=8 {
        lookup(&mut cache, key);
        lookup(&mut cache, key);
    }
    println!("\nFrequent keys (MRU first): {:?}", cache.frequent_keys().collect::<Vec<_>>());

    // A scan of 50 never-repeated keys cannot evict anything
    for key in 50..100 {
        lookup(&mut cache, key);
    }
    println!("After scanning keys 50..100:");
    println!("  len: {}", cache.len());
    println!("  contains 1? {}", cache.contains(&1));

    // Promoting a ninth key evicts the least recently used one
    lookup(&mut cache, 9);
    lookup(&mut cache, 9);
    println!("\nAfter promoting key 9:");
    println!("  contains 1? {} (least recently used)", cache.contains(&1));
    println!("  contains 9? {}", cache.contains(&9));

    println!("\nBacking store fetches: {}", fetches);
}
