//! Deterministic key-to-shard mapping for the sharded 2Q cache.
//!
//! Used by `ShardedTwoQCache` (feature `concurrency`) so that every key is
//! always routed to the same independently locked cache. Per-key promotion
//! then behaves exactly as in a single cache.
//!
//! ## Architecture
//!
//! ```text
//!   key ──► SipHash(seed, key) % shards ──► shard index
//!
//!   ┌─────────┬─────────┬─────────┬─────────┐
//!   │ Shard 0 │ Shard 1 │ Shard 2 │ Shard 3 │   one TwoQCache each
//!   └─────────┴─────────┴─────────┴─────────┘
//! ```
//!
//! The selector hashes with `DefaultHasher`, not the Fx hash used inside each
//! shard's index, so keys sharing a shard are not clustered in its table.
//!
//! ## Example Usage
//!
//! ```
//! use tiny2q::ds::ShardSelector;
//!
//! let selector = ShardSelector::new(4, 0);
//! let shard = selector.shard_for_key(&12345_u64);
//! assert!(shard < 4);
//! assert_eq!(selector.shard_for_key(&12345_u64), shard);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Seeded hash selector mapping keys to `[0, shards)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardSelector {
    shards: usize,
    seed: u64,
}

impl ShardSelector {
    /// Creates a selector for `shards` shards. The count is clamped to at least 1.
    ///
    /// ```
    /// use tiny2q::ds::ShardSelector;
    ///
    /// assert_eq!(ShardSelector::new(0, 7).shard_count(), 1);
    /// ```
    pub fn new(shards: usize, seed: u64) -> Self {
        Self {
            shards: shards.max(1),
            seed,
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shards
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Maps a key to its shard index.
    #[inline]
    pub fn shard_for_key<K: Hash>(&self, key: &K) -> usize {
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.shards
    }
}

impl Default for ShardSelector {
    /// Single shard, seed 0.
    fn default() -> Self {
        Self::new(1, 0)
    }
}
