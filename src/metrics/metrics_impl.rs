use crate::metrics::traits::{CoreMetricsRecorder, TwoQMetricsRecorder};

// ---------------------------------------------------------------------------
// TwoQMetrics
// ---------------------------------------------------------------------------

/// Live counters owned by a [`TwoQCache`](crate::policy::two_q::TwoQCache).
///
/// `get_*` counters track classifications: a hit is a frequent-tier hit, a
/// miss is anything else (recent or absent). `insert_*` counters track
/// promotions into the frequent tier.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TwoQMetrics {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,
    pub recent_hits: u64,
    pub insert_new: u64,
    pub insert_updates: u64,
    pub evicted_entries: u64,
    pub recency_adds: u64,
    pub clears: u64,
}

impl CoreMetricsRecorder for TwoQMetrics {
    fn record_get_hit(&mut self) {
        self.get_calls += 1;
        self.get_hits += 1;
    }
    fn record_get_miss(&mut self) {
        self.get_calls += 1;
        self.get_misses += 1;
    }
    fn record_insert_new(&mut self) {
        self.insert_new += 1;
    }
    fn record_insert_update(&mut self) {
        self.insert_updates += 1;
    }
    fn record_evicted_entry(&mut self) {
        self.evicted_entries += 1;
    }
    fn record_clear(&mut self) {
        self.clears += 1;
    }
}

impl TwoQMetricsRecorder for TwoQMetrics {
    fn record_recent_hit(&mut self) {
        self.recent_hits += 1;
    }
    fn record_recency_add(&mut self) {
        self.recency_adds += 1;
    }
}
