pub use crate::builder::CacheBuilder;
pub use crate::ds::{RecencyBuffer, ShardSelector, SlotId, SlotList};
pub use crate::error::{ConfigError, InvariantError};
pub use crate::policy::two_q::{
    Condition, DEFAULT_ARENA_RATIO, DEFAULT_RECENT_RATIO, Probe, TwoQCache,
};
#[cfg(feature = "concurrency")]
pub use crate::policy::two_q::{ConcurrentTwoQCache, ShardedTwoQCache};
pub use crate::store::frequent::{FrequentStore, Promotion};
pub use crate::traits::{ConcurrentCache, TieredCache};

#[cfg(feature = "metrics")]
pub use crate::metrics::exporter::PrometheusTextExporter;
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::TwoQMetricsSnapshot;
#[cfg(feature = "metrics")]
pub use crate::metrics::traits::{MetricsExporter, MetricsSnapshotProvider};
