//! DHAT heap profiler for tiny2q.
//!
//! Checks that the `test`/`observe` hot path never touches the heap once the
//! cache is constructed.
//!
//! Run with: cargo run --bin dhat_profile --release --features dhat-heap
//! View results: Open dhat-heap.json in <https://nnethercote.github.io/dh_view/dh_view.html>

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use tiny2q::policy::two_q::{Condition, TwoQCache};

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
}

/// One protocol round; returns whether the key was a frequent hit.
fn lookup(cache: &mut TwoQCache<u64, u64>, key: u64) -> bool {
    let mut v = 0;
    let cond = cache.test(&key, &mut v);
    if cond == Condition::Frequent {
        return true;
    }
    cache.observe(cond, key, key.wrapping_mul(31));
    false
}

/// 90% of accesses hit 10% of keys.
fn hotset_workload(cache: &mut TwoQCache<u64, u64>, operations: usize, universe: u64) -> u64 {
    let mut rng = XorShift64::new(42);
    let hot = universe / 10;
    let mut hits = 0;
    for _ in 0..operations {
        let r = rng.next_u64();
        let key = if r % 10 != 0 {
            r % hot
        } else {
            hot + r % (universe - hot)
        };
        hits += u64::from(lookup(cache, key));
    }
    hits
}

/// Every key seen once: exercises the recent tier only.
fn scan_workload(cache: &mut TwoQCache<u64, u64>, operations: usize) {
    for i in 0..operations as u64 {
        lookup(cache, 1_000_000 + i);
    }
}

/// Every key seen twice: each promotion evicts once the tier is full.
fn promotion_churn(cache: &mut TwoQCache<u64, u64>, operations: usize) {
    for i in 0..operations as u64 {
        let key = 2_000_000 + i;
        lookup(cache, key);
        lookup(cache, key);
    }
}

fn main() {
    let _profiler = dhat::Profiler::new_heap();

    println!("tiny2q DHAT Heap Profiling");
    println!("==========================\n");

    let capacity = 4096;
    let operations = 100_000;
    let universe = 16_384;

    let mut cache: TwoQCache<u64, u64> = TwoQCache::new(capacity);
    let after_new = dhat::HeapStats::get();
    println!(
        "  After construction: {} blocks, {} bytes",
        after_new.total_blocks, after_new.total_bytes
    );

    let hits = hotset_workload(&mut cache, operations, universe);
    scan_workload(&mut cache, operations / 2);
    promotion_churn(&mut cache, operations / 4);
    cache.clear();

    let after_run = dhat::HeapStats::get();
    println!("  Hotset hits: {}", hits);
    println!("  Final size: {}", cache.len());
    println!(
        "  Allocations during workload: {}",
        after_run.total_blocks - after_new.total_blocks
    );

    assert_eq!(
        after_run.total_blocks, after_new.total_blocks,
        "test/observe allocated on the hot path"
    );

    println!("\n==========================");
    println!("Profile saved to dhat-heap.json");
}
