//! Workload generators for 2Q benchmarks.
//!
//! Key streams are precomputed and shuffled with a seeded `SmallRng` so every
//! run replays the same accesses.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use tiny2q::policy::two_q::{Condition, TwoQCache};

/// Substring searched for in every fetched value to give lookups a real cost.
pub const NEEDLE: &str = "prod";

/// Backing store standing in for slow memory: `u32` keys to random strings.
pub fn backing_store(keys: u32, seed: u64) -> FxHashMap<u32, String> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut map = FxHashMap::default();
    map.reserve(keys as usize);
    for key in 0..keys {
        let len = rng.random_range(1..=64);
        let s: String = (0..len)
            .map(|_| char::from(rng.random_range(32u8..=126)))
            .collect();
        map.insert(key, s);
    }
    map
}

/// Power-law access stream over `keys` distinct keys.
///
/// Key 0 appears `head` times, and each following key appears `decay / 10`
/// as often as its predecessor, at least once. `decay` is in `1..=9`; larger
/// values flatten the distribution.
pub fn power_law_accesses(keys: u32, head: u64, decay: u64, seed: u64) -> Vec<u32> {
    let decay = decay.clamp(1, 9);
    let mut accesses = Vec::new();
    let mut times = head.max(1);
    for key in 0..keys {
        accesses.extend(std::iter::repeat_n(key, times as usize));
        times = (times / 10 * decay).max(1);
    }
    let mut rng = SmallRng::seed_from_u64(seed);
    accesses.shuffle(&mut rng);
    accesses
}

/// The value the cache stores: whether the backing string contains the needle.
#[inline]
pub fn fetch(store: &FxHashMap<u32, String>, key: u32) -> bool {
    store.get(&key).is_some_and(|s| s.contains(NEEDLE))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HitRate {
    pub hits: u64,
    pub misses: u64,
}

impl HitRate {
    pub fn hit_rate(self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Replays `accesses` through `cache` with the test/observe protocol.
pub fn run_cached(
    cache: &mut TwoQCache<u32, bool>,
    store: &FxHashMap<u32, String>,
    accesses: &[u32],
) -> (u64, HitRate) {
    let mut n = 0u64;
    let mut rate = HitRate::default();
    for &key in accesses {
        let mut v = false;
        let cond = cache.test(&key, &mut v);
        if cond == Condition::Frequent {
            rate.hits += 1;
        } else {
            rate.misses += 1;
            v = fetch(store, key);
            cache.observe(cond, key, v);
        }
        n += u64::from(v);
    }
    (n, rate)
}

/// Replays `accesses` straight against the backing store.
pub fn run_uncached(store: &FxHashMap<u32, String>, accesses: &[u32]) -> u64 {
    accesses
        .iter()
        .map(|&key| u64::from(fetch(store, key)))
        .sum()
}
