/// Point-in-time copy of a 2Q cache's counters and gauges.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TwoQMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,
    pub recent_hits: u64,

    pub insert_new: u64,
    pub insert_updates: u64,
    pub evicted_entries: u64,

    pub recency_adds: u64,
    pub clears: u64,

    pub cache_len: usize,
    pub capacity: usize,
    pub recent_capacity: usize,
}

impl TwoQMetricsSnapshot {
    /// Fraction of classifications served from the frequent tier.
    ///
    /// Returns `0.0` before the first classification.
    pub fn hit_ratio(&self) -> f64 {
        if self.get_calls == 0 {
            0.0
        } else {
            self.get_hits as f64 / self.get_calls as f64
        }
    }
}
