//! Error types for tiny2q.
//!
//! The hot-path operations (`test`, `observe`, `add`) are total and never
//! fail. Errors only arise at construction time or from debug invariant
//! checks:
//!
//! - [`ConfigError`]: invalid construction parameters (zero capacity, zero
//!   ratio, zero shards).
//! - [`InvariantError`]: the frequent index and frequent list disagree
//!   (returned by `check_invariants`).
//!
//! ## Example Usage
//!
//! ```
//! use tiny2q::error::ConfigError;
//! use tiny2q::policy::two_q::TwoQCache;
//!
//! let cache: Result<TwoQCache<u32, bool>, ConfigError> = TwoQCache::try_new(1024);
//! assert!(cache.is_ok());
//!
//! let err = TwoQCache::<u32, bool>::try_new(0).unwrap_err();
//! assert!(err.to_string().contains("capacity"));
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when the frequent tier's index and list disagree.
///
/// Produced by
/// [`TwoQCache::check_invariants`](crate::policy::two_q::TwoQCache::check_invariants)
/// and [`FrequentStore::check_invariants`](crate::store::frequent::FrequentStore::check_invariants).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invariant violated: {}", self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when construction parameters are invalid.
///
/// Produced by [`TwoQCache::try_new`](crate::policy::two_q::TwoQCache::try_new),
/// [`TwoQCache::try_with_ratios`](crate::policy::two_q::TwoQCache::try_with_ratios)
/// and [`CacheBuilder::try_build`](crate::builder::CacheBuilder::try_build).
///
/// # Example
///
/// ```
/// use tiny2q::builder::CacheBuilder;
///
/// let err = CacheBuilder::new(64)
///     .recent_ratio(0)
///     .try_build::<u64, u64>()
///     .unwrap_err();
/// assert!(err.message().contains("recent_ratio"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
