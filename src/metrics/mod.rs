//! Optional counters for the 2Q cache (feature `metrics`).
//!
//! Recording, snapshotting and export are split into separate traits:
//! [`TwoQCache`](crate::policy::two_q::TwoQCache) records into
//! [`TwoQMetrics`](metrics_impl::TwoQMetrics), tests and benches read a
//! [`TwoQMetricsSnapshot`](snapshot::TwoQMetricsSnapshot), and monitoring
//! publishes snapshots through a [`MetricsExporter`](traits::MetricsExporter)
//! such as [`PrometheusTextExporter`](exporter::PrometheusTextExporter).
//!
//! ```
//! use tiny2q::metrics::exporter::PrometheusTextExporter;
//! use tiny2q::metrics::traits::{MetricsExporter, MetricsSnapshotProvider};
//! use tiny2q::policy::two_q::TwoQCache;
//! use tiny2q::traits::TieredCache;
//!
//! let mut cache: TwoQCache<u32, u32> = TwoQCache::new(8);
//! for _ in 0..3 {
//!     cache.access(1, |k| *k);
//! }
//!
//! let exporter = PrometheusTextExporter::new("tiny2q", Vec::new());
//! exporter.export(&cache.snapshot());
//! let text = String::from_utf8(exporter.into_inner()).unwrap();
//! assert!(text.contains("tiny2q_get_hits_total 1"));
//! ```

pub mod exporter;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;
