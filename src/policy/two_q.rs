//! Two-tier (2Q) admission cache core.
//!
//! Separates keys seen once ("recent") from keys seen repeatedly
//! ("frequent"). A key must be seen twice before it is given a slot in the
//! frequent tier, so one-off accesses from scans cannot flush hot keys.
//!
//! The cache never fetches values itself. It is a decision layer driven by a
//! two-call protocol:
//!
//! 1. [`TwoQCache::test`] classifies a key as [`Condition::Frequent`],
//!    [`Condition::Recent`] or [`Condition::Absent`]. Frequent keys yield
//!    their cached value.
//! 2. On anything but `Frequent`, the caller fetches the value from its
//!    backing store and hands the same condition back through
//!    [`TwoQCache::observe`].
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                            TwoQCache<K, V>                                  │
//! │                                                                             │
//! │   recents: RecencyBuffer<K>              frequent: FrequentStore<K, V>      │
//! │   (R = N / recent_ratio slots)           (N slots, LRU ordered)             │
//! │   ┌────┬────┬────┬────┐                  head                     tail      │
//! │   │ k7 │ k3 │ k9 │ _  │                   ▼                        ▼        │
//! │   └────┴────┴────┴────┘                 [k42] ◄─► [k5] ◄─► ... ◄─► [_]      │
//! │          cursor ▲                         MRU                     victim    │
//! │                                                                             │
//! │   test(k):                                                                  │
//! │     frequent hit  → copy value out, splice slot to head  → Frequent         │
//! │     in recents    →                                      → Recent           │
//! │     otherwise     →                                      → Absent           │
//! │                                                                             │
//! │   observe(c, k, v):                                                         │
//! │     Frequent → nothing                                                      │
//! │     Recent   → overwrite tail slot with k (evict old key), splice to head   │
//! │     Absent   → recents.add(k)                                               │
//! └─────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key State Machine
//!
//! ```text
//!            observe(Absent)          observe(Recent)
//!   absent ──────────────────► recent ───────────────► frequent
//!     ▲                          │                        │
//!     └──── overwritten in ──────┘                        │
//!           recents (FIFO)                                │
//!     ▲                                                   │
//!     └────────────── evicted from LRU tail ──────────────┘
//! ```
//!
//! ## Operations
//!
//! | Operation  | Time | Allocates | Notes                                |
//! |------------|------|-----------|--------------------------------------|
//! | `test`     | O(R) | no        | O(1) on frequent hits                |
//! | `observe`  | O(1) | no        | At most one eviction per promotion   |
//! | `peek`     | O(1) | no        | Frequent tier only, no reordering    |
//! | `clear`    | O(N) | no        | Keeps all storage                    |
//!
//! ## Example Usage
//!
//! ```
//! use tiny2q::policy::two_q::{Condition, TwoQCache};
//!
//! let mut cache: TwoQCache<u32, bool> = TwoQCache::new(16);
//! let mut value = false;
//!
//! // First sighting: unknown
//! let cond = cache.test(&42, &mut value);
//! assert_eq!(cond, Condition::Absent);
//! cache.observe(cond, 42, true);
//!
//! // Second sighting: seen once before
//! let cond = cache.test(&42, &mut value);
//! assert_eq!(cond, Condition::Recent);
//! cache.observe(cond, 42, true);
//!
//! // Third sighting: served from the frequent tier
//! assert_eq!(cache.test(&42, &mut value), Condition::Frequent);
//! assert!(value);
//! ```
//!
//! ## Thread Safety
//!
//! - [`TwoQCache`]: single-threaded; no locks, no atomics
//! - `ConcurrentTwoQCache` / `ShardedTwoQCache` (feature `concurrency`):
//!   hold one `parking_lot::Mutex` around each `test`/`observe` pair
//!
//! ## Implementation Notes
//!
//! - Empty slots are `None`, so the whole key domain is usable
//! - The frequent list always has exactly `N` slots; filling and evicting are
//!   the same operation
//! - The index table is reserved at `max(N * arena_ratio, 2 * N)` entries up
//!   front; below half full it never has to grow to purge deleted buckets
//!
//! ## References
//!
//! - Johnson & Shasha, "2Q: A Low Overhead High Performance Buffer Management
//!   Replacement Algorithm", VLDB 1994

use std::hash::Hash;

use log::{debug, trace};

use crate::ds::recency_buffer::RecencyBuffer;
use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::TwoQMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::TwoQMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{CoreMetricsRecorder, MetricsSnapshotProvider, TwoQMetricsRecorder};
use crate::store::frequent::{FrequentStore, Promotion};
use crate::traits::TieredCache;

/// Frequent-tier slots per recent-tier slot.
pub const DEFAULT_RECENT_RATIO: usize = 8;

/// Index entries reserved per frequent-tier slot.
pub const DEFAULT_ARENA_RATIO: usize = 32;

/// Classification of a key, returned by `test` and passed back to `observe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    /// Resident in the frequent tier; the cached value was returned.
    Frequent,
    /// Seen once recently; the next `observe` promotes it.
    Recent,
    /// Not known to the cache; the next `observe` records it as recent.
    Absent,
}

/// Borrowing form of a classification: frequent hits carry the value.
#[derive(Debug, PartialEq, Eq)]
pub enum Probe<'a, V> {
    Frequent(&'a V),
    Recent,
    Absent,
}

impl<V> Probe<'_, V> {
    /// Drops the borrowed value, keeping the classification.
    #[inline]
    pub fn condition(&self) -> Condition {
        match self {
            Probe::Frequent(_) => Condition::Frequent,
            Probe::Recent => Condition::Recent,
            Probe::Absent => Condition::Absent,
        }
    }
}

/// Two-tier scan-resistant admission cache.
///
/// # Type Parameters
///
/// - `K`: Key type, `Copy + Eq + Hash`. Every value is a legal key.
/// - `V`: Value type, stored by value
///
/// # Example
///
/// ```
/// use tiny2q::policy::two_q::TwoQCache;
/// use tiny2q::traits::TieredCache;
///
/// let mut cache: TwoQCache<u64, u64> = TwoQCache::new(1024);
/// assert_eq!(cache.capacity(), 1024);
/// assert_eq!(cache.recent_capacity(), 128);
///
/// // The closure only runs when the frequent tier misses
/// let mut fetches = 0;
/// for _ in 0..5 {
///     let v = cache.access(7, |k| {
///         fetches += 1;
///         k * 10
///     });
///     assert_eq!(v, 70);
/// }
/// assert_eq!(fetches, 2);
/// ```
#[derive(Debug)]
pub struct TwoQCache<K, V> {
    frequent: FrequentStore<K, V>,
    recents: RecencyBuffer<K>,
    recent_ratio: usize,
    arena_ratio: usize,
    #[cfg(feature = "metrics")]
    metrics: TwoQMetrics,
}

impl<K, V> TwoQCache<K, V>
where
    K: Copy + Eq + Hash,
{
    /// Creates a cache with `capacity` frequent slots and default ratios.
    ///
    /// The index is reserved for `capacity * DEFAULT_ARENA_RATIO` entries of
    /// `(K, V, SlotId)`, which dominates the footprint: with `u64` keys and
    /// values, 2^20 slots reserve about 1.6 GiB. Large caches that do not need
    /// the headroom should lower `arena_ratio` with
    /// [`with_ratios`](Self::with_ratios); 2 is enough to keep the hot path
    /// allocation-free.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. See [`try_new`](Self::try_new).
    pub fn new(capacity: usize) -> Self {
        Self::with_ratios(capacity, DEFAULT_RECENT_RATIO, DEFAULT_ARENA_RATIO)
    }

    /// Creates a cache with default ratios, returning an error on zero capacity.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        Self::try_with_ratios(capacity, DEFAULT_RECENT_RATIO, DEFAULT_ARENA_RATIO)
    }

    /// Creates a cache with custom tier ratios.
    ///
    /// # Panics
    ///
    /// Panics if parameters are invalid. See [`try_with_ratios`](Self::try_with_ratios).
    pub fn with_ratios(capacity: usize, recent_ratio: usize, arena_ratio: usize) -> Self {
        match Self::try_with_ratios(capacity, recent_ratio, arena_ratio) {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    /// Creates a cache with custom tier ratios, returning an error on invalid
    /// parameters.
    ///
    /// - `recent_ratio`: frequent slots per recent slot. The recent tier gets
    ///   `max(capacity / recent_ratio, 1)` slots.
    /// - `arena_ratio`: index entries reserved per frequent slot. The
    ///   reservation never drops below `2 * capacity`, so a ratio of 1
    ///   behaves like 2.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any argument is zero or the index reservation
    /// overflows `usize`.
    ///
    /// ```
    /// use tiny2q::policy::two_q::TwoQCache;
    ///
    /// let cache = TwoQCache::<u32, u32>::try_with_ratios(100, 4, 2).unwrap();
    /// assert_eq!(cache.recent_capacity(), 25);
    ///
    /// assert!(TwoQCache::<u32, u32>::try_with_ratios(100, 0, 2).is_err());
    /// ```
    pub fn try_with_ratios(
        capacity: usize,
        recent_ratio: usize,
        arena_ratio: usize,
    ) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("cache capacity must be greater than zero"));
        }
        if recent_ratio == 0 {
            return Err(ConfigError::new("recent_ratio must be greater than zero"));
        }
        if arena_ratio == 0 {
            return Err(ConfigError::new("arena_ratio must be greater than zero"));
        }
        let index_reserve = capacity.checked_mul(arena_ratio).ok_or_else(|| {
            ConfigError::new(format!(
                "capacity {} * arena_ratio {} overflows",
                capacity, arena_ratio
            ))
        })?;
        let recent_capacity = (capacity / recent_ratio).max(1);

        debug!(
            "2Q cache: {} frequent slots, {} recent slots, index reserved for {}",
            capacity, recent_capacity, index_reserve
        );

        Ok(Self {
            frequent: FrequentStore::new(capacity, index_reserve),
            recents: RecencyBuffer::new(recent_capacity),
            recent_ratio,
            arena_ratio,
            #[cfg(feature = "metrics")]
            metrics: TwoQMetrics::default(),
        })
    }

    /// Classifies `key`, returning the cached value on a frequent hit.
    ///
    /// A frequent hit makes `key` the most recently used.
    #[inline]
    pub fn probe(&mut self, key: &K) -> Probe<'_, V> {
        if let Some(value) = self.frequent.get_and_touch(key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_get_hit();
            return Probe::Frequent(value);
        }
        if self.recents.test(key) {
            #[cfg(feature = "metrics")]
            {
                self.metrics.record_get_miss();
                self.metrics.record_recent_hit();
            }
            return Probe::Recent;
        }
        #[cfg(feature = "metrics")]
        self.metrics.record_get_miss();
        Probe::Absent
    }

    /// Classifies `key`.
    ///
    /// On [`Condition::Frequent`] the cached value is written to `value` and
    /// `key` becomes the most recently used. On any other result `value` is
    /// left untouched and must not be read.
    #[inline]
    pub fn test(&mut self, key: &K, value: &mut V) -> Condition
    where
        V: Clone,
    {
        match self.probe(key) {
            Probe::Frequent(cached) => {
                value.clone_from(cached);
                Condition::Frequent
            },
            Probe::Recent => Condition::Recent,
            Probe::Absent => Condition::Absent,
        }
    }

    /// Updates the tiers after a non-frequent [`test`](Self::test).
    ///
    /// `condition` must be the result of the immediately preceding `test` for
    /// the same `key`.
    ///
    /// - `Frequent`: nothing to do.
    /// - `Recent`: promote `key` with `value` into the frequent tier, evicting
    ///   the least recently used key once the tier is full.
    /// - `Absent`: remember `key` as recently seen. `value` is dropped.
    #[inline]
    pub fn observe(&mut self, condition: Condition, key: K, value: V) {
        match condition {
            Condition::Frequent => {},
            Condition::Recent => self.promote(key, value),
            Condition::Absent => {
                self.recents.add(key);
                #[cfg(feature = "metrics")]
                self.metrics.record_recency_add();
            },
        }
    }

    fn promote(&mut self, key: K, value: V) {
        match self.frequent.promote(key, value) {
            Promotion::Filled => {
                #[cfg(feature = "metrics")]
                self.metrics.record_insert_new();
            },
            Promotion::Evicted(_) => {
                trace!("2Q promotion evicted the least recently used frequent key");
                #[cfg(feature = "metrics")]
                {
                    self.metrics.record_insert_new();
                    self.metrics.record_evicted_entry();
                }
            },
            Promotion::Refreshed => {
                #[cfg(feature = "metrics")]
                self.metrics.record_insert_update();
            },
            Promotion::Rejected => {},
        }
    }

    /// Returns the frequent-tier value for `key` without reordering.
    #[inline]
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.frequent.peek(key)
    }

    /// Returns `true` if `key` is in the frequent tier. Does not reorder.
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.frequent.contains(key)
    }

    /// Returns `true` if `key` is remembered by the recent tier.
    #[inline]
    pub fn is_recent(&self, key: &K) -> bool {
        self.recents.test(key)
    }

    /// Returns the number of keys in the frequent tier.
    #[inline]
    pub fn len(&self) -> usize {
        self.frequent.len()
    }

    /// Returns `true` if the frequent tier holds no keys.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frequent.is_empty()
    }

    /// Returns the number of frequent-tier slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.frequent.capacity()
    }

    /// Returns the number of recent-tier slots.
    #[inline]
    pub fn recent_capacity(&self) -> usize {
        self.recents.capacity()
    }

    /// Returns the configured frequent-to-recent ratio.
    pub fn recent_ratio(&self) -> usize {
        self.recent_ratio
    }

    /// Returns the configured index reservation ratio.
    pub fn arena_ratio(&self) -> usize {
        self.arena_ratio
    }

    /// Iterates over frequent keys from most to least recently used.
    pub fn frequent_keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.frequent.keys()
    }

    /// Iterates over recent-tier keys, newest first.
    pub fn recent_keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.recents.iter()
    }

    /// Forgets every key in both tiers. Storage is kept for reuse.
    pub fn clear(&mut self) {
        debug!(
            "2Q cache cleared ({} frequent keys dropped)",
            self.frequent.len()
        );
        self.frequent.clear();
        self.recents.clear();
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();
    }

    /// Validates the frequent tier's index/list correspondence.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.frequent.check_invariants()?;
        if self.frequent.len() > self.frequent.capacity() {
            return Err(InvariantError::new(format!(
                "{} frequent keys exceed capacity {}",
                self.frequent.len(),
                self.frequent.capacity()
            )));
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        self.frequent.debug_validate_invariants();
        self.recents.debug_validate_invariants();
    }
}

impl<K, V> TieredCache<K, V> for TwoQCache<K, V>
where
    K: Copy + Eq + Hash,
{
    #[inline]
    fn probe(&mut self, key: &K) -> Probe<'_, V> {
        TwoQCache::probe(self, key)
    }

    #[inline]
    fn observe(&mut self, condition: Condition, key: K, value: V) {
        TwoQCache::observe(self, condition, key, value)
    }

    fn contains(&self, key: &K) -> bool {
        TwoQCache::contains(self, key)
    }

    fn len(&self) -> usize {
        TwoQCache::len(self)
    }

    fn capacity(&self) -> usize {
        TwoQCache::capacity(self)
    }

    fn clear(&mut self) {
        TwoQCache::clear(self)
    }
}

#[cfg(feature = "metrics")]
impl<K, V> TwoQCache<K, V>
where
    K: Copy + Eq + Hash,
{
    /// Returns the live counters.
    pub fn metrics(&self) -> &TwoQMetrics {
        &self.metrics
    }

    /// Resets every counter to zero.
    pub fn reset_metrics(&mut self) {
        self.metrics = TwoQMetrics::default();
    }

    pub fn metrics_snapshot(&self) -> TwoQMetricsSnapshot {
        TwoQMetricsSnapshot {
            get_calls: self.metrics.get_calls,
            get_hits: self.metrics.get_hits,
            get_misses: self.metrics.get_misses,
            recent_hits: self.metrics.recent_hits,
            insert_new: self.metrics.insert_new,
            insert_updates: self.metrics.insert_updates,
            evicted_entries: self.metrics.evicted_entries,
            recency_adds: self.metrics.recency_adds,
            clears: self.metrics.clears,
            cache_len: self.frequent.len(),
            capacity: self.frequent.capacity(),
            recent_capacity: self.recents.capacity(),
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<TwoQMetricsSnapshot> for TwoQCache<K, V>
where
    K: Copy + Eq + Hash,
{
    fn snapshot(&self) -> TwoQMetricsSnapshot {
        self.metrics_snapshot()
    }
}

// ---------------------------------------------------------------------------
// Externally synchronised wrappers
// ---------------------------------------------------------------------------

#[cfg(feature = "concurrency")]
pub use self::concurrent::{ConcurrentTwoQCache, ShardedTwoQCache};

#[cfg(feature = "concurrency")]
mod concurrent {
    use std::hash::Hash;

    use parking_lot::Mutex;

    use super::{DEFAULT_ARENA_RATIO, DEFAULT_RECENT_RATIO, Probe, TwoQCache};
    use crate::ds::shard::ShardSelector;
    use crate::error::ConfigError;
    use crate::traits::ConcurrentCache;

    /// [`TwoQCache`] behind a single `parking_lot::Mutex`.
    ///
    /// Every `test`/`observe` pair runs under one lock acquisition. The lock is
    /// released while the caller's fetch runs and the key is classified again
    /// before observing, so the pairing holds even if another thread touched
    /// the key in between.
    ///
    /// ```
    /// use tiny2q::policy::two_q::ConcurrentTwoQCache;
    ///
    /// let cache: ConcurrentTwoQCache<u32, u32> = ConcurrentTwoQCache::new(64);
    /// assert_eq!(cache.get_or_fetch(5, |k| k + 1), 6);
    /// assert_eq!(cache.get(&5), None);
    /// assert_eq!(cache.get_or_fetch(5, |k| k + 1), 6);
    /// assert_eq!(cache.get(&5), Some(6));
    /// ```
    #[derive(Debug)]
    pub struct ConcurrentTwoQCache<K, V> {
        inner: Mutex<TwoQCache<K, V>>,
    }

    impl<K, V> ConcurrentTwoQCache<K, V>
    where
        K: Copy + Eq + Hash,
    {
        /// Creates a cache with `capacity` frequent slots and default ratios.
        ///
        /// # Panics
        ///
        /// Panics if `capacity` is zero.
        pub fn new(capacity: usize) -> Self {
            Self::from_cache(TwoQCache::new(capacity))
        }

        /// Wraps an existing cache.
        pub fn from_cache(cache: TwoQCache<K, V>) -> Self {
            Self {
                inner: Mutex::new(cache),
            }
        }

        /// Returns a clone of the frequent-tier value, refreshing its recency.
        ///
        /// Misses are not recorded; use [`get_or_fetch`](Self::get_or_fetch)
        /// to drive promotion.
        pub fn get(&self, key: &K) -> Option<V>
        where
            V: Clone,
        {
            match self.inner.lock().probe(key) {
                Probe::Frequent(value) => Some(value.clone()),
                _ => None,
            }
        }

        /// Returns the cached value or runs `fetch` and records the access.
        pub fn get_or_fetch<F>(&self, key: K, fetch: F) -> V
        where
            F: FnOnce(&K) -> V,
            V: Clone,
        {
            match self.try_get_or_fetch(key, |k| Ok::<V, std::convert::Infallible>(fetch(k))) {
                Ok(value) => value,
                Err(never) => match never {},
            }
        }

        /// Fallible form of [`get_or_fetch`](Self::get_or_fetch).
        ///
        /// A failed fetch is not recorded.
        pub fn try_get_or_fetch<F, E>(&self, key: K, fetch: F) -> Result<V, E>
        where
            F: FnOnce(&K) -> Result<V, E>,
            V: Clone,
        {
            if let Probe::Frequent(value) = self.inner.lock().probe(&key) {
                return Ok(value.clone());
            }

            let value = fetch(&key)?;

            let mut cache = self.inner.lock();
            let condition = cache.probe(&key).condition();
            cache.observe(condition, key, value.clone());
            Ok(value)
        }

        /// Runs `f` with exclusive access to the underlying cache.
        pub fn with_lock<R>(&self, f: impl FnOnce(&mut TwoQCache<K, V>) -> R) -> R {
            let mut cache = self.inner.lock();
            f(&mut cache)
        }

        /// Returns `true` if `key` is in the frequent tier.
        pub fn contains(&self, key: &K) -> bool {
            self.inner.lock().contains(key)
        }

        /// Returns the number of frequent keys.
        pub fn len(&self) -> usize {
            self.inner.lock().len()
        }

        /// Returns `true` if no key is frequent.
        pub fn is_empty(&self) -> bool {
            self.inner.lock().is_empty()
        }

        /// Returns the number of frequent-tier slots.
        pub fn capacity(&self) -> usize {
            self.inner.lock().capacity()
        }

        /// Forgets every key.
        pub fn clear(&self) {
            self.inner.lock().clear();
        }

        /// Consumes the wrapper, returning the cache.
        pub fn into_inner(self) -> TwoQCache<K, V> {
            self.inner.into_inner()
        }
    }

    impl<K: Send, V: Send> ConcurrentCache for ConcurrentTwoQCache<K, V> {}

    /// Key-sharded set of independently locked [`TwoQCache`]s.
    ///
    /// Each key always maps to the same shard, so per-key promotion behaves as
    /// in a single cache while unrelated keys contend on different locks.
    ///
    /// ```
    /// use tiny2q::policy::two_q::ShardedTwoQCache;
    ///
    /// let cache: ShardedTwoQCache<u64, u64> = ShardedTwoQCache::new(1024, 8);
    /// assert_eq!(cache.shard_count(), 8);
    /// assert_eq!(cache.capacity(), 1024);
    /// for _ in 0..3 {
    ///     assert_eq!(cache.get_or_fetch(9, |k| k * 2), 18);
    /// }
    /// assert!(cache.contains(&9));
    /// ```
    #[derive(Debug)]
    pub struct ShardedTwoQCache<K, V> {
        shards: Box<[ConcurrentTwoQCache<K, V>]>,
        selector: ShardSelector,
    }

    impl<K, V> ShardedTwoQCache<K, V>
    where
        K: Copy + Eq + Hash,
    {
        /// Creates `shards` caches sharing `capacity` frequent slots.
        ///
        /// # Panics
        ///
        /// Panics if `capacity` or `shards` is zero.
        pub fn new(capacity: usize, shards: usize) -> Self {
            match Self::try_new(capacity, shards, 0) {
                Ok(cache) => cache,
                Err(e) => panic!("{}", e),
            }
        }

        /// Creates `shards` caches sharing `capacity` frequent slots, with a
        /// seeded shard selector and default ratios.
        ///
        /// Each shard gets `ceil(capacity / shards)` slots.
        pub fn try_new(capacity: usize, shards: usize, seed: u64) -> Result<Self, ConfigError> {
            Self::try_with_ratios(
                capacity,
                shards,
                seed,
                DEFAULT_RECENT_RATIO,
                DEFAULT_ARENA_RATIO,
            )
        }

        /// Like [`try_new`](Self::try_new), with every shard built by
        /// [`TwoQCache::try_with_ratios`] from its share of `capacity`.
        pub fn try_with_ratios(
            capacity: usize,
            shards: usize,
            seed: u64,
            recent_ratio: usize,
            arena_ratio: usize,
        ) -> Result<Self, ConfigError> {
            if shards == 0 {
                return Err(ConfigError::new("shard count must be greater than zero"));
            }
            if capacity == 0 {
                return Err(ConfigError::new("cache capacity must be greater than zero"));
            }
            let per_shard = capacity.div_ceil(shards);
            let shards = (0..shards)
                .map(|_| {
                    TwoQCache::try_with_ratios(per_shard, recent_ratio, arena_ratio)
                        .map(ConcurrentTwoQCache::from_cache)
                })
                .collect::<Result<Box<[_]>, _>>()?;
            let selector = ShardSelector::new(shards.len(), seed);
            Ok(Self { shards, selector })
        }

        /// Returns the shard responsible for `key`.
        #[inline]
        pub fn shard(&self, key: &K) -> &ConcurrentTwoQCache<K, V> {
            &self.shards[self.selector.shard_for_key(key)]
        }

        /// Returns the number of shards.
        pub fn shard_count(&self) -> usize {
            self.shards.len()
        }

        /// See [`ConcurrentTwoQCache::get`].
        pub fn get(&self, key: &K) -> Option<V>
        where
            V: Clone,
        {
            self.shard(key).get(key)
        }

        /// See [`ConcurrentTwoQCache::get_or_fetch`].
        pub fn get_or_fetch<F>(&self, key: K, fetch: F) -> V
        where
            F: FnOnce(&K) -> V,
            V: Clone,
        {
            self.shard(&key).get_or_fetch(key, fetch)
        }

        /// See [`ConcurrentTwoQCache::try_get_or_fetch`].
        pub fn try_get_or_fetch<F, E>(&self, key: K, fetch: F) -> Result<V, E>
        where
            F: FnOnce(&K) -> Result<V, E>,
            V: Clone,
        {
            self.shard(&key).try_get_or_fetch(key, fetch)
        }

        /// Returns `true` if `key` is in its shard's frequent tier.
        pub fn contains(&self, key: &K) -> bool {
            self.shard(key).contains(key)
        }

        /// Returns the number of frequent keys across all shards.
        pub fn len(&self) -> usize {
            self.shards.iter().map(ConcurrentTwoQCache::len).sum()
        }

        /// Returns `true` if no shard holds a frequent key.
        pub fn is_empty(&self) -> bool {
            self.shards.iter().all(ConcurrentTwoQCache::is_empty)
        }

        /// Returns the total number of frequent-tier slots.
        pub fn capacity(&self) -> usize {
            self.shards.iter().map(ConcurrentTwoQCache::capacity).sum()
        }

        /// Forgets every key in every shard.
        pub fn clear(&self) {
            for shard in self.shards.iter() {
                shard.clear();
            }
        }
    }

    impl<K: Send, V: Send> ConcurrentCache for ShardedTwoQCache<K, V> {}
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Runs one full protocol round for `key` and returns the classification.
    fn touch<V: Clone + Default>(cache: &mut TwoQCache<i32, V>, key: i32, value: V) -> Condition {
        let mut out = V::default();
        let cond = cache.test(&key, &mut out);
        cache.observe(cond, key, value);
        cond
    }

    // ==============================================
    // Classification
    // ==============================================

    mod classification {
        use super::*;

        #[test]
        fn unseen_key_is_absent() {
            let mut cache: TwoQCache<i32, bool> = TwoQCache::new(16);
            let mut v = false;
            for key in [0, 1, 42, i32::MAX, i32::MIN] {
                assert_eq!(cache.test(&key, &mut v), Condition::Absent);
            }
            assert!(!v);
        }

        #[test]
        fn promotion_round_trip() {
            let mut cache: TwoQCache<i32, bool> = TwoQCache::new(16);
            let mut v = false;

            let cond = cache.test(&42, &mut v);
            assert_eq!(cond, Condition::Absent);
            assert!(!v);
            cache.observe(cond, 42, true);

            let cond = cache.test(&42, &mut v);
            assert_eq!(cond, Condition::Recent);
            assert!(!v, "value must not be written on a recent hit");
            cache.observe(cond, 42, true);

            let cond = cache.test(&42, &mut v);
            assert_eq!(cond, Condition::Frequent);
            assert!(v);
            cache.debug_validate_invariants();
        }

        #[test]
        fn absent_observe_caches_no_value() {
            let mut cache: TwoQCache<i32, u8> = TwoQCache::new(16);
            cache.observe(Condition::Absent, 5, 99);
            assert_eq!(cache.peek(&5), None);
            assert!(cache.is_recent(&5));
            assert!(cache.is_empty());

            cache.observe(Condition::Absent, 6, 0);
            let recent: Vec<i32> = cache.recent_keys().copied().collect();
            assert_eq!(recent, vec![6, 5]);
        }

        #[test]
        fn frequent_observe_is_noop() {
            let mut cache: TwoQCache<i32, u8> = TwoQCache::new(4);
            touch(&mut cache, 1, 10);
            touch(&mut cache, 1, 10);
            let mut v = 0;
            assert_eq!(cache.test(&1, &mut v), Condition::Frequent);
            cache.observe(Condition::Frequent, 1, 77);
            assert_eq!(cache.peek(&1), Some(&10));
            assert_eq!(cache.len(), 1);
        }

        #[test]
        fn max_key_is_a_real_key() {
            let mut cache: TwoQCache<i32, bool> = TwoQCache::new(4);
            touch(&mut cache, i32::MAX, true);
            touch(&mut cache, i32::MAX, true);
            let mut v = false;
            assert_eq!(cache.test(&i32::MAX, &mut v), Condition::Frequent);
            assert!(v);
        }

        #[test]
        fn probe_exposes_value_by_reference() {
            let mut cache: TwoQCache<i32, String> = TwoQCache::new(4);
            cache.observe(Condition::Absent, 3, String::new());
            cache.observe(Condition::Recent, 3, "three".to_string());
            assert_eq!(cache.probe(&3), Probe::Frequent(&"three".to_string()));
            assert_eq!(cache.probe(&4).condition(), Condition::Absent);
        }
    }

    // ==============================================
    // Eviction
    // ==============================================

    mod eviction {
        use super::*;

        const COUNT: i32 = 16;

        fn cache_with_frequent_42() -> TwoQCache<i32, bool> {
            let mut cache = TwoQCache::new(COUNT as usize);
            touch(&mut cache, 42, true);
            touch(&mut cache, 42, true);
            cache
        }

        #[test]
        fn no_premature_eviction_while_slots_are_empty() {
            let mut cache = cache_with_frequent_42();
            let mut v = false;

            for i in 0..COUNT {
                let cond = cache.test(&i, &mut v);
                assert_eq!(cond, Condition::Absent);
                cache.observe(cond, i, v);
            }

            assert_eq!(cache.test(&42, &mut v), Condition::Frequent);
            assert!(v);
            assert_eq!(cache.len(), 1);
        }

        #[test]
        fn lru_eviction_order() {
            let mut cache = cache_with_frequent_42();
            let mut v = false;
            for i in 0..COUNT {
                touch(&mut cache, i, false);
            }

            for i in COUNT..COUNT * 2 {
                let cond = cache.test(&i, &mut v);
                cache.observe(cond, i, v);
                let cond = cache.test(&i, &mut v);
                cache.observe(cond, i, v);
                assert_eq!(cache.test(&i, &mut v), Condition::Frequent);
            }

            assert_eq!(cache.test(&42, &mut v), Condition::Absent);
            for i in COUNT..COUNT * 2 {
                assert_eq!(cache.test(&i, &mut v), Condition::Frequent);
            }
            assert_eq!(cache.len(), COUNT as usize);
            cache.debug_validate_invariants();
        }

        #[test]
        fn access_protects_from_eviction() {
            let mut cache: TwoQCache<i32, bool> = TwoQCache::new(COUNT as usize);
            let mut v = false;
            for i in COUNT..COUNT * 2 {
                touch(&mut cache, i, true);
                touch(&mut cache, i, true);
            }

            for _ in 0..1024 {
                assert_eq!(cache.test(&(COUNT + 15), &mut v), Condition::Frequent);
                assert_eq!(cache.test(&COUNT, &mut v), Condition::Frequent);
            }
            for i in COUNT..COUNT * 2 {
                assert_eq!(cache.test(&i, &mut v), Condition::Frequent);
            }
            assert_eq!(cache.len(), COUNT as usize);
        }

        #[test]
        fn repeated_hits_are_idempotent_and_keep_head() {
            let mut cache: TwoQCache<i32, u32> = TwoQCache::new(8);
            for k in 0..4 {
                cache.observe(Condition::Absent, k, 0);
                cache.observe(Condition::Recent, k, k as u32 * 100);
            }
            let mut v = 0;
            for _ in 0..10 {
                assert_eq!(cache.test(&1, &mut v), Condition::Frequent);
                assert_eq!(v, 100);
                assert_eq!(cache.frequent_keys().next(), Some(&1));
            }
            assert_eq!(cache.len(), 4);
        }

        #[test]
        fn touched_key_survives_next_eviction() {
            let mut cache: TwoQCache<i32, ()> = TwoQCache::new(2);
            cache.observe(Condition::Recent, 1, ());
            cache.observe(Condition::Recent, 2, ());
            let mut v = ();
            assert_eq!(cache.test(&1, &mut v), Condition::Frequent);

            cache.observe(Condition::Recent, 3, ());
            assert!(cache.contains(&1));
            assert!(!cache.contains(&2));
            assert!(cache.contains(&3));
        }

        #[test]
        fn duplicate_promotion_refreshes_instead_of_duplicating() {
            let mut cache: TwoQCache<i32, u8> = TwoQCache::new(3);
            cache.observe(Condition::Recent, 1, 1);
            cache.observe(Condition::Recent, 2, 2);
            cache.observe(Condition::Recent, 1, 11);
            assert_eq!(cache.len(), 2);
            assert_eq!(cache.peek(&1), Some(&11));
            cache.check_invariants().unwrap();
        }
    }

    // ==============================================
    // Construction and housekeeping
    // ==============================================

    mod construction {
        use super::*;

        #[test]
        fn derived_recent_capacity() {
            let cache: TwoQCache<u32, u32> = TwoQCache::new(1024);
            assert_eq!(cache.recent_capacity(), 128);
            assert_eq!(cache.recent_ratio(), DEFAULT_RECENT_RATIO);
            assert_eq!(cache.arena_ratio(), DEFAULT_ARENA_RATIO);

            let small: TwoQCache<u32, u32> = TwoQCache::new(3);
            assert_eq!(small.recent_capacity(), 1);
        }

        #[test]
        fn capacity_one_works() {
            let mut cache: TwoQCache<i32, i32> = TwoQCache::new(1);
            touch(&mut cache, 1, 1);
            touch(&mut cache, 1, 1);
            touch(&mut cache, 2, 2);
            touch(&mut cache, 2, 2);
            assert!(!cache.contains(&1));
            assert!(cache.contains(&2));
            cache.debug_validate_invariants();
        }

        #[test]
        fn zero_capacity_is_rejected() {
            let err = TwoQCache::<u32, u32>::try_new(0).unwrap_err();
            assert!(err.message().contains("capacity"));
        }

        #[test]
        #[should_panic(expected = "capacity")]
        fn zero_capacity_panics_in_new() {
            let _cache: TwoQCache<u32, u32> = TwoQCache::new(0);
        }

        #[test]
        fn zero_ratios_are_rejected() {
            assert!(TwoQCache::<u32, u32>::try_with_ratios(8, 0, 1).is_err());
            assert!(TwoQCache::<u32, u32>::try_with_ratios(8, 1, 0).is_err());
            assert!(TwoQCache::<u32, u32>::try_with_ratios(usize::MAX, 1, 2).is_err());
        }

        #[test]
        fn clear_forgets_both_tiers() {
            let mut cache: TwoQCache<i32, i32> = TwoQCache::new(8);
            touch(&mut cache, 1, 1);
            touch(&mut cache, 1, 1);
            touch(&mut cache, 2, 2);
            cache.clear();

            let mut v = 0;
            assert_eq!(cache.test(&1, &mut v), Condition::Absent);
            assert_eq!(cache.test(&2, &mut v), Condition::Absent);
            assert!(cache.is_empty());
            assert_eq!(cache.capacity(), 8);
            cache.debug_validate_invariants();
        }

        #[test]
        fn access_runs_protocol() {
            let mut cache: TwoQCache<u32, u32> = TwoQCache::new(8);
            let mut fetched = Vec::new();
            for _ in 0..4 {
                let v = cache.access(3, |k| {
                    fetched.push(*k);
                    k + 1
                });
                assert_eq!(v, 4);
            }
            assert_eq!(fetched, vec![3, 3]);
            assert!(cache.contains(&3));
        }

        #[test]
        fn try_access_failure_is_not_recorded() {
            let mut cache: TwoQCache<u32, u32> = TwoQCache::new(8);
            let err = cache.try_access(3, |_| Err::<u32, &str>("backend down"));
            assert_eq!(err, Err("backend down"));
            assert!(!cache.is_recent(&3));

            assert_eq!(cache.try_access(3, |k| Ok::<_, &str>(*k)), Ok(3));
            assert!(cache.is_recent(&3));
        }
    }

    #[cfg(feature = "metrics")]
    mod metrics {
        use super::*;

        #[test]
        fn counters_follow_protocol() {
            let mut cache: TwoQCache<i32, i32> = TwoQCache::new(1);
            touch(&mut cache, 1, 1);
            touch(&mut cache, 1, 1);
            touch(&mut cache, 1, 1);
            touch(&mut cache, 2, 2);
            touch(&mut cache, 2, 2);

            let snap = cache.snapshot();
            assert_eq!(snap.get_calls, 5);
            assert_eq!(snap.get_hits, 1);
            assert_eq!(snap.get_misses, 4);
            assert_eq!(snap.recent_hits, 2);
            assert_eq!(snap.recency_adds, 2);
            assert_eq!(snap.insert_new, 2);
            assert_eq!(snap.evicted_entries, 1);
            assert_eq!(snap.cache_len, 1);
            assert_eq!(snap.capacity, 1);
            assert_eq!(snap.recent_capacity, 1);

            cache.reset_metrics();
            assert_eq!(cache.metrics().get_calls, 0);
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[cfg_attr(miri, ignore)]
            #[test]
            fn prop_invariants_hold_under_protocol(
                capacity in 1usize..40,
                keys in prop::collection::vec(0i32..80, 0..300)
            ) {
                let mut cache: TwoQCache<i32, i32> = TwoQCache::new(capacity);
                for key in keys {
                    let mut v = 0;
                    let cond = cache.test(&key, &mut v);
                    if cond == Condition::Frequent {
                        prop_assert_eq!(v, key * 3);
                    }
                    cache.observe(cond, key, key * 3);
                    prop_assert!(cache.len() <= capacity);
                    prop_assert!(cache.check_invariants().is_ok());
                }
            }

            #[cfg_attr(miri, ignore)]
            #[test]
            fn prop_single_touch_scan_never_evicts(
                capacity in 1usize..32,
                scan in prop::collection::hash_set(1000i32..5000, 0..200)
            ) {
                let mut cache: TwoQCache<i32, i32> = TwoQCache::new(capacity);
                let hot: Vec<i32> = (0..capacity as i32).collect();
                for &k in &hot {
                    touch(&mut cache, k, k);
                    touch(&mut cache, k, k);
                }
                for &k in &scan {
                    prop_assert_ne!(touch(&mut cache, k, k), Condition::Frequent);
                }
                for k in &hot {
                    prop_assert!(cache.contains(k));
                }
            }

            #[cfg_attr(miri, ignore)]
            #[test]
            fn prop_identical_sequences_are_deterministic(
                capacity in 1usize..16,
                keys in prop::collection::vec(0i32..32, 0..200)
            ) {
                let mut a: TwoQCache<i32, i32> = TwoQCache::new(capacity);
                let mut b: TwoQCache<i32, i32> = TwoQCache::new(capacity);
                for &key in &keys {
                    prop_assert_eq!(touch(&mut a, key, key), touch(&mut b, key, key));
                }
                let ka: Vec<i32> = a.frequent_keys().copied().collect();
                let kb: Vec<i32> = b.frequent_keys().copied().collect();
                prop_assert_eq!(ka, kb);
            }
        }
    }
}
