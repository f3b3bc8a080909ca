//! Counter snapshots exposed by the estimators.
//!
//! Every estimator keeps a handful of plain `u64` counters on its hot
//! path and materializes them into one of these `Copy` snapshot structs
//! on demand. Gauges (threshold, scale, tracked population) are read at
//! snapshot time.

/// Counters for the exact Olken estimator.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OlkenMetricsSnapshot {
    pub accesses: u64,
    pub hits: u64,
    pub misses: u64,

    // gauges captured at snapshot time
    pub tracked_len: usize,
}

/// Counters for the fixed-rate SHARDS estimator.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FixedRateShardsMetricsSnapshot {
    pub accesses: u64,
    pub sampled: u64,
    pub dropped: u64,

    pub threshold: u64,
    pub scale: u64,
    pub tracked_len: usize,
}

/// Counters for the fixed-size SHARDS estimator.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FixedSizeShardsMetricsSnapshot {
    pub accesses: u64,
    pub sampled: u64,
    pub dropped: u64,
    pub evicted: u64,
    pub eviction_rounds: u64,

    pub threshold: u64,
    pub scale: u64,
    pub tracked_len: usize,
}

/// Counters for the Mimir estimator.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MimirMetricsSnapshot {
    pub accesses: u64,
    pub hits: u64,
    pub misses: u64,
    pub agings: u64,

    pub num_unique: u64,
}

/// Counters for the evicting-map estimator.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EvictingMapMetricsSnapshot {
    pub accesses: u64,
    pub inserted: u64,
    pub updated: u64,
    pub replaced: u64,
    pub ignored: u64,

    pub threshold: u64,
    pub scale: u64,
    pub tracked_len: usize,
}
