//! Fluent builder for 2Q caches.
//!
//! Collects sizing parameters and produces a [`TwoQCache`] (or, with the
//! `concurrency` feature, its locked and sharded wrappers).
//!
//! ## Example
//!
//! ```rust
//! use tiny2q::builder::CacheBuilder;
//!
//! let cache = CacheBuilder::new(4096)
//!     .recent_ratio(16)
//!     .build::<u64, u32>();
//! assert_eq!(cache.capacity(), 4096);
//! assert_eq!(cache.recent_capacity(), 256);
//! ```

use std::hash::Hash;

use crate::error::ConfigError;
use crate::policy::two_q::{DEFAULT_ARENA_RATIO, DEFAULT_RECENT_RATIO, TwoQCache};
#[cfg(feature = "concurrency")]
use crate::policy::two_q::{ConcurrentTwoQCache, ShardedTwoQCache};

/// Sizing parameters for a 2Q cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheBuilder {
    capacity: usize,
    recent_ratio: usize,
    arena_ratio: usize,
    shards: usize,
    seed: u64,
}

impl CacheBuilder {
    /// Starts a builder for `capacity` frequent slots with default ratios.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            recent_ratio: DEFAULT_RECENT_RATIO,
            arena_ratio: DEFAULT_ARENA_RATIO,
            shards: 1,
            seed: 0,
        }
    }

    /// Frequent slots per recent slot.
    pub fn recent_ratio(mut self, ratio: usize) -> Self {
        self.recent_ratio = ratio;
        self
    }

    /// Index entries reserved per frequent slot.
    pub fn arena_ratio(mut self, ratio: usize) -> Self {
        self.arena_ratio = ratio;
        self
    }

    /// Number of shards used by [`build_sharded`](Self::build_sharded).
    pub fn shards(mut self, shards: usize) -> Self {
        self.shards = shards;
        self
    }

    /// Seed for the shard selector.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builds the cache.
    ///
    /// # Panics
    ///
    /// Panics on invalid parameters. See [`try_build`](Self::try_build).
    pub fn build<K, V>(self) -> TwoQCache<K, V>
    where
        K: Copy + Eq + Hash,
    {
        match self.try_build() {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    /// Builds the cache, returning an error on zero capacity or a zero ratio.
    pub fn try_build<K, V>(self) -> Result<TwoQCache<K, V>, ConfigError>
    where
        K: Copy + Eq + Hash,
    {
        TwoQCache::try_with_ratios(self.capacity, self.recent_ratio, self.arena_ratio)
    }

    /// Builds a single-lock thread-safe cache.
    #[cfg(feature = "concurrency")]
    pub fn try_build_concurrent<K, V>(self) -> Result<ConcurrentTwoQCache<K, V>, ConfigError>
    where
        K: Copy + Eq + Hash,
    {
        self.try_build().map(ConcurrentTwoQCache::from_cache)
    }

    /// Builds a key-sharded thread-safe cache splitting `capacity` across
    /// the configured shard count. Each shard uses the configured ratios.
    #[cfg(feature = "concurrency")]
    pub fn try_build_sharded<K, V>(self) -> Result<ShardedTwoQCache<K, V>, ConfigError>
    where
        K: Copy + Eq + Hash,
    {
        ShardedTwoQCache::try_with_ratios(
            self.capacity,
            self.shards,
            self.seed,
            self.recent_ratio,
            self.arena_ratio,
        )
    }

    /// Panicking form of [`try_build_sharded`](Self::try_build_sharded).
    #[cfg(feature = "concurrency")]
    pub fn build_sharded<K, V>(self) -> ShardedTwoQCache<K, V>
    where
        K: Copy + Eq + Hash,
    {
        match self.try_build_sharded() {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::two_q::Condition;

    #[test]
    fn test_defaults_match_constructor() {
        let built = CacheBuilder::new(256).build::<u32, u32>();
        let direct: TwoQCache<u32, u32> = TwoQCache::new(256);
        assert_eq!(built.capacity(), direct.capacity());
        assert_eq!(built.recent_capacity(), direct.recent_capacity());
        assert_eq!(built.arena_ratio(), DEFAULT_ARENA_RATIO);
    }

    #[test]
    fn test_custom_ratios_are_applied() {
        let cache = CacheBuilder::new(100)
            .recent_ratio(10)
            .arena_ratio(2)
            .build::<u32, ()>();
        assert_eq!(cache.recent_capacity(), 10);
        assert_eq!(cache.arena_ratio(), 2);
    }

    #[test]
    fn test_built_cache_runs_protocol() {
        let mut cache = CacheBuilder::new(4).build::<u8, u8>();
        let mut v = 0;
        assert_eq!(cache.test(&1, &mut v), Condition::Absent);
        cache.observe(Condition::Absent, 1, 10);
        assert_eq!(cache.test(&1, &mut v), Condition::Recent);
    }

    #[test]
    fn test_invalid_parameters_are_reported() {
        let err = CacheBuilder::new(0).try_build::<u32, u32>().unwrap_err();
        assert!(err.message().contains("capacity"));

        let err = CacheBuilder::new(8)
            .arena_ratio(0)
            .try_build::<u32, u32>()
            .unwrap_err();
        assert!(err.message().contains("arena_ratio"));
    }

    #[test]
    #[should_panic(expected = "recent_ratio")]
    fn test_build_panics_on_zero_ratio() {
        let _ = CacheBuilder::new(8).recent_ratio(0).build::<u32, u32>();
    }

    #[cfg(feature = "concurrency")]
    #[test]
    fn test_sharded_build_splits_capacity() {
        let cache = CacheBuilder::new(10).shards(4).seed(3).build_sharded::<u32, u32>();
        assert_eq!(cache.shard_count(), 4);
        assert_eq!(cache.capacity(), 12);

        assert!(
            CacheBuilder::new(10)
                .shards(0)
                .try_build_sharded::<u32, u32>()
                .is_err()
        );
    }

    #[cfg(feature = "concurrency")]
    #[test]
    fn test_sharded_build_applies_ratios() {
        let single = CacheBuilder::new(64).recent_ratio(1).build::<u32, u32>();
        let sharded = CacheBuilder::new(64)
            .recent_ratio(1)
            .arena_ratio(2)
            .shards(1)
            .build_sharded::<u32, u32>();
        let (recent, arena) = sharded
            .shard(&0)
            .with_lock(|cache| (cache.recent_capacity(), cache.arena_ratio()));
        assert_eq!(recent, single.recent_capacity());
        assert_eq!(recent, 64);
        assert_eq!(arena, 2);

        let split = CacheBuilder::new(64)
            .recent_ratio(4)
            .shards(4)
            .build_sharded::<u32, u32>();
        assert_eq!(split.shard(&7).with_lock(|cache| cache.recent_capacity()), 4);

        assert!(
            CacheBuilder::new(64)
                .shards(2)
                .recent_ratio(0)
                .try_build_sharded::<u32, u32>()
                .is_err()
        );
    }
}
