//! # Tiered Cache Traits
//!
//! Generic interface over two-call admission caches: a caller classifies a
//! key with `probe`/`test`, fetches from its backing store on a miss, then
//! reports back with `observe`.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │                   TieredCache<K, V>                          │
//!   │                                                              │
//!   │  required                                                    │
//!   │    probe(&mut, &K) → Probe<&V>                               │
//!   │    observe(&mut, Condition, K, V)                            │
//!   │    contains / len / capacity / clear                         │
//!   │                                                              │
//!   │  provided                                                    │
//!   │    test(&mut, &K, &mut V) → Condition      (V: Clone)        │
//!   │    access(&mut, K, fetch) → V              (V: Clone)        │
//!   │    try_access(&mut, K, fetch) → Result<V, E>                 │
//!   │    is_empty                                                  │
//!   └──────────────────────────────────────────────────────────────┘
//!
//!   ConcurrentCache: Send + Sync marker for internally locked caches
//! ```
//!
//! ## Example
//!
//! ```
//! use tiny2q::policy::two_q::TwoQCache;
//! use tiny2q::traits::TieredCache;
//!
//! fn lookup<C: TieredCache<u64, String>>(cache: &mut C, key: u64) -> String {
//!     cache.access(key, |k| format!("row-{}", k))
//! }
//!
//! let mut cache = TwoQCache::new(64);
//! assert_eq!(lookup(&mut cache, 3), "row-3");
//! ```

use std::convert::Infallible;

use crate::policy::two_q::{Condition, Probe};

/// A cache driven by the classify-then-observe protocol.
///
/// Implementors only decide what to keep; they never fetch values
/// themselves.
pub trait TieredCache<K, V> {
    /// Classifies `key`, returning a borrowed value on a frequent hit.
    fn probe(&mut self, key: &K) -> Probe<'_, V>;

    /// Records the outcome of the preceding classification of `key`.
    fn observe(&mut self, condition: Condition, key: K, value: V);

    /// Checks frequent-tier residency without touching recency.
    fn contains(&self, key: &K) -> bool;

    /// Returns the number of frequent entries.
    fn len(&self) -> usize;

    /// Returns `true` if no entry is frequent.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of frequent slots.
    fn capacity(&self) -> usize;

    /// Forgets every key.
    fn clear(&mut self);

    /// Classifies `key`, copying the cached value into `value` on a frequent hit.
    fn test(&mut self, key: &K, value: &mut V) -> Condition
    where
        V: Clone,
    {
        match self.probe(key) {
            Probe::Frequent(cached) => {
                value.clone_from(cached);
                Condition::Frequent
            },
            other => other.condition(),
        }
    }

    /// Runs one full protocol round: returns the cached value, or calls
    /// `fetch` and observes the result.
    fn access<F>(&mut self, key: K, fetch: F) -> V
    where
        F: FnOnce(&K) -> V,
        V: Clone,
    {
        match self.try_access(key, |k| Ok::<V, Infallible>(fetch(k))) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Fallible form of [`access`](Self::access). A failed fetch leaves the
    /// cache as if the key had only been probed.
    ///
    /// ```
    /// use tiny2q::policy::two_q::TwoQCache;
    /// use tiny2q::traits::TieredCache;
    ///
    /// let mut cache: TwoQCache<u32, u32> = TwoQCache::new(8);
    /// let res = cache.try_access(1, |_| Err("unavailable"));
    /// assert_eq!(res, Err("unavailable"));
    /// assert!(!cache.is_recent(&1));
    /// ```
    fn try_access<F, E>(&mut self, key: K, fetch: F) -> Result<V, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
        V: Clone,
    {
        let condition = match self.probe(&key) {
            Probe::Frequent(value) => return Ok(value.clone()),
            other => other.condition(),
        };
        let value = fetch(&key)?;
        self.observe(condition, key, value.clone());
        Ok(value)
    }
}

/// Marker for caches that synchronise internally and can be shared by
/// reference across threads.
///
/// ```
/// use tiny2q::traits::ConcurrentCache;
///
/// fn share<C: ConcurrentCache>(_cache: &C) {}
/// ```
pub trait ConcurrentCache: Send + Sync {}
