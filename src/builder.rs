//! Unified estimator builder for all policies.
//!
//! Provides a single entry point that validates the configuration and
//! hides which concrete estimator sits behind the uniform access/curve
//! surface.
//!
//! ## Example
//!
//! ```rust
//! use mrckit::builder::{EstimatorBuilder, EstimatorPolicy, HistogramSpec};
//!
//! let mut est = EstimatorBuilder::new(HistogramSpec::new(1 << 12, 1))
//!     .try_build(EstimatorPolicy::FixedSizeShards {
//!         sampling_ratio: 0.1,
//!         max_tracked: 8192,
//!     })
//!     .unwrap();
//! for key in [1u64, 2, 1, 3, 1] {
//!     est.access(key).unwrap();
//! }
//! let mrc = est.miss_ratio_curve().unwrap();
//! assert_eq!(mrc.values()[0], 1.0);
//! ```

use crate::error::{ConfigError, CorruptStateError};
use crate::estimator::{EvictingMap, FixedRateShards, FixedSizeShards, Mimir, Olken};
use crate::histogram::{FractionalHistogram, Histogram};
use crate::metrics::{
    EvictingMapMetricsSnapshot, FixedRateShardsMetricsSnapshot, FixedSizeShardsMetricsSnapshot,
    MimirMetricsSnapshot, OlkenMetricsSnapshot,
};
use crate::mrc::MissRatioCurve;
use crate::traits::ReuseDistanceEstimator;

pub use crate::estimator::mimir::MimirAgingPolicy;

/// Histogram geometry shared by every estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistogramSpec {
    pub num_bins: usize,
    pub bin_width: u64,
}

impl HistogramSpec {
    /// Creates a spec with `num_bins` bins of `bin_width` entries each.
    pub fn new(num_bins: usize, bin_width: u64) -> Self {
        Self {
            num_bins,
            bin_width,
        }
    }
}

/// Available reuse-distance estimation policies.
#[derive(Debug, Clone, PartialEq)]
pub enum EstimatorPolicy {
    /// Exact baseline: order-statistic tree over every key.
    Olken,
    /// Constant-rate spatial sampling around an Olken core.
    FixedRateShards { sampling_ratio: f64 },
    /// Bounded-sample spatial sampling with an adaptive threshold.
    FixedSizeShards {
        sampling_ratio: f64,
        max_tracked: usize,
    },
    /// Bucketed recency approximation with the chosen aging policy.
    Mimir {
        num_buckets: usize,
        aging: MimirAgingPolicy,
    },
    /// Self-tuning sampling over a min-hash-keeping slot table.
    EvictingMap {
        sampling_ratio: f64,
        num_slots: usize,
    },
}

/// Borrowed view of an estimator's histogram; Mimir accumulates
/// fractional bins, everything else integer bins.
#[derive(Debug, Clone, Copy)]
pub enum EstimatorHistogram<'a> {
    Integer(&'a Histogram),
    Fractional(&'a FractionalHistogram),
}

impl EstimatorHistogram<'_> {
    /// Returns the total mass recorded, whichever flavor backs it.
    pub fn running_sum(&self) -> u64 {
        match self {
            EstimatorHistogram::Integer(hist) => hist.running_sum(),
            EstimatorHistogram::Fractional(hist) => hist.running_sum(),
        }
    }
}

/// Per-policy counter snapshots, for drivers that report diagnostics
/// without knowing the concrete estimator.
#[derive(Debug, Clone, Copy)]
pub enum EstimatorMetrics {
    Olken(OlkenMetricsSnapshot),
    FixedRateShards(FixedRateShardsMetricsSnapshot),
    FixedSizeShards(FixedSizeShardsMetricsSnapshot),
    Mimir(MimirMetricsSnapshot),
    EvictingMap(EvictingMapMetricsSnapshot),
}

/// Uniform wrapper over the estimator family.
pub struct Estimator {
    inner: EstimatorInner,
}

enum EstimatorInner {
    Olken(Olken),
    FixedRateShards(FixedRateShards),
    FixedSizeShards(FixedSizeShards),
    Mimir(Mimir),
    EvictingMap(EvictingMap),
}

impl Estimator {
    /// Feeds one access into the estimator.
    pub fn access(&mut self, key: u64) -> Result<(), CorruptStateError> {
        match &mut self.inner {
            EstimatorInner::Olken(olken) => olken.access(key),
            EstimatorInner::FixedRateShards(shards) => shards.access(key),
            EstimatorInner::FixedSizeShards(shards) => shards.access(key),
            EstimatorInner::Mimir(mimir) => mimir.access(key),
            EstimatorInner::EvictingMap(map) => map.access(key),
        }
    }

    /// Converts the accumulated histogram into a miss-ratio curve.
    pub fn miss_ratio_curve(&self) -> Result<MissRatioCurve, CorruptStateError> {
        match &self.inner {
            EstimatorInner::Olken(olken) => olken.miss_ratio_curve(),
            EstimatorInner::FixedRateShards(shards) => shards.miss_ratio_curve(),
            EstimatorInner::FixedSizeShards(shards) => shards.miss_ratio_curve(),
            EstimatorInner::Mimir(mimir) => mimir.miss_ratio_curve(),
            EstimatorInner::EvictingMap(map) => map.miss_ratio_curve(),
        }
    }

    /// Returns the number of accesses consumed.
    pub fn num_accesses(&self) -> u64 {
        match &self.inner {
            EstimatorInner::Olken(olken) => olken.num_accesses(),
            EstimatorInner::FixedRateShards(shards) => shards.num_accesses(),
            EstimatorInner::FixedSizeShards(shards) => shards.num_accesses(),
            EstimatorInner::Mimir(mimir) => mimir.num_accesses(),
            EstimatorInner::EvictingMap(map) => map.num_accesses(),
        }
    }

    /// Returns the number of keys currently tracked.
    pub fn tracked_len(&self) -> usize {
        match &self.inner {
            EstimatorInner::Olken(olken) => olken.tracked_len(),
            EstimatorInner::FixedRateShards(shards) => shards.tracked_len(),
            EstimatorInner::FixedSizeShards(shards) => shards.tracked_len(),
            EstimatorInner::Mimir(mimir) => mimir.tracked_len(),
            EstimatorInner::EvictingMap(map) => map.tracked_len(),
        }
    }

    /// Returns a borrowed view of the accumulated histogram.
    pub fn histogram(&self) -> EstimatorHistogram<'_> {
        match &self.inner {
            EstimatorInner::Olken(olken) => EstimatorHistogram::Integer(olken.histogram()),
            EstimatorInner::FixedRateShards(shards) => {
                EstimatorHistogram::Integer(shards.histogram())
            },
            EstimatorInner::FixedSizeShards(shards) => {
                EstimatorHistogram::Integer(shards.histogram())
            },
            EstimatorInner::Mimir(mimir) => EstimatorHistogram::Fractional(mimir.histogram()),
            EstimatorInner::EvictingMap(map) => EstimatorHistogram::Integer(map.histogram()),
        }
    }

    /// Returns the policy-specific counter snapshot.
    pub fn metrics(&self) -> EstimatorMetrics {
        match &self.inner {
            EstimatorInner::Olken(olken) => EstimatorMetrics::Olken(olken.metrics()),
            EstimatorInner::FixedRateShards(shards) => {
                EstimatorMetrics::FixedRateShards(shards.metrics())
            },
            EstimatorInner::FixedSizeShards(shards) => {
                EstimatorMetrics::FixedSizeShards(shards.metrics())
            },
            EstimatorInner::Mimir(mimir) => EstimatorMetrics::Mimir(mimir.metrics()),
            EstimatorInner::EvictingMap(map) => EstimatorMetrics::EvictingMap(map.metrics()),
        }
    }
}

/// Builder for estimator instances.
pub struct EstimatorBuilder {
    histogram: HistogramSpec,
}

impl EstimatorBuilder {
    /// Creates a builder with the given histogram geometry.
    pub fn new(histogram: HistogramSpec) -> Self {
        Self { histogram }
    }

    /// Builds an estimator with the chosen policy, validating every
    /// parameter.
    pub fn try_build(self, policy: EstimatorPolicy) -> Result<Estimator, ConfigError> {
        let HistogramSpec {
            num_bins,
            bin_width,
        } = self.histogram;
        let inner = match policy {
            EstimatorPolicy::Olken => EstimatorInner::Olken(Olken::try_new(num_bins, bin_width)?),
            EstimatorPolicy::FixedRateShards { sampling_ratio } => EstimatorInner::FixedRateShards(
                FixedRateShards::try_new(sampling_ratio, num_bins, bin_width)?,
            ),
            EstimatorPolicy::FixedSizeShards {
                sampling_ratio,
                max_tracked,
            } => EstimatorInner::FixedSizeShards(FixedSizeShards::try_new(
                sampling_ratio,
                max_tracked,
                num_bins,
                bin_width,
            )?),
            EstimatorPolicy::Mimir { num_buckets, aging } => {
                EstimatorInner::Mimir(Mimir::try_new(num_buckets, aging, num_bins, bin_width)?)
            },
            EstimatorPolicy::EvictingMap {
                sampling_ratio,
                num_slots,
            } => EstimatorInner::EvictingMap(EvictingMap::try_new(
                sampling_ratio,
                num_slots,
                num_bins,
                bin_width,
            )?),
        };
        Ok(Estimator { inner })
    }
}
