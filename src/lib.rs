//! tiny2q: a small, allocation-free two-tier (2Q) admission cache.
//!
//! The cache decides which keys deserve a slot; the caller owns the backing
//! store. Every lookup is a two-step protocol: [`TwoQCache::test`] classifies
//! a key, and on a miss the caller fetches the value and reports back with
//! [`TwoQCache::observe`].
//!
//! ```
//! use tiny2q::prelude::*;
//!
//! let mut cache: TwoQCache<u32, bool> = TwoQCache::new(1024);
//! let mut value = false;
//! let cond = cache.test(&42, &mut value);
//! if cond != Condition::Frequent {
//!     value = true; // fetched from the backing store
//!     cache.observe(cond, 42, value);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`ds`]: fixed-size building blocks (recency ring, slot list, shard selector)
//! - [`store`]: the frequent tier (LRU list plus hash index)
//! - [`policy`]: the 2Q state machine and its thread-safe wrappers
//! - [`builder`]: fluent construction with custom ratios
//! - `metrics` (feature `metrics`): counters, snapshots, Prometheus export

pub mod builder;
pub mod ds;
pub mod error;
pub mod policy;
pub mod prelude;
pub mod store;
pub mod traits;

#[cfg(feature = "metrics")]
pub mod metrics;

pub use crate::policy::two_q::{Condition, TwoQCache};
