//! Fixed-rate SHARDS: hash-sampled Olken.
//!
//! Spatial sampling at a constant rate `R`: a key is admitted iff its
//! hash falls at or below `⌊R · 2⁶⁴⌋`, which selects a uniform,
//! trace-independent `R`-fraction of the key space. Admitted accesses run
//! through an ordinary Olken stack; every histogram write applies the
//! Waldspurger adjustment with scale `⌊1/R⌋` (sampled distances stand for
//! distances `1/R` larger, each carrying `1/R` accesses' worth of
//! weight). At `R = 1` the estimator *is* Olken, bit for bit.
//!
//! The optional SHARDS-adj correction tallies how far the realized sample
//! count drifted from `R · accesses` and folds the scaled difference into
//! the first histogram bin during [`post_process`](FixedRateShards::post_process).

use crate::error::{ConfigError, CorruptStateError};
use crate::hash::{sampling_threshold, Hasher64, SplitMix64};
use crate::histogram::Histogram;
use crate::metrics::FixedRateShardsMetricsSnapshot;
use crate::mrc::MissRatioCurve;
use crate::traits::ReuseDistanceEstimator;

use super::olken::Olken;

/// Hash-sampled Olken estimator with a fixed admission rate.
///
/// # Example
///
/// ```
/// use mrckit::estimator::FixedRateShards;
///
/// let mut shards = FixedRateShards::try_new(0.1, 1 << 10, 1).unwrap();
/// for key in 0..1000u64 {
///     shards.access(key).unwrap();
/// }
/// // Roughly a tenth of the keys were admitted, each weighted by 10.
/// let snapshot = shards.metrics();
/// assert!(snapshot.sampled < 200);
/// ```
#[derive(Debug)]
pub struct FixedRateShards<H: Hasher64 = SplitMix64> {
    olken: Olken,
    hasher: H,
    sampling_ratio: f64,
    threshold: u64,
    scale: u64,

    adjustment: bool,
    accesses: u64,
    sampled: u64,
}

impl FixedRateShards<SplitMix64> {
    /// Creates an estimator sampling at `sampling_ratio`, hashing keys
    /// with splitmix64.
    pub fn try_new(
        sampling_ratio: f64,
        num_bins: usize,
        bin_width: u64,
    ) -> Result<Self, ConfigError> {
        Self::try_with_hasher(sampling_ratio, num_bins, bin_width, false, SplitMix64)
    }

    /// Creates an estimator with the SHARDS-adj first-bin correction
    /// enabled.
    pub fn try_new_with_adjustment(
        sampling_ratio: f64,
        num_bins: usize,
        bin_width: u64,
    ) -> Result<Self, ConfigError> {
        Self::try_with_hasher(sampling_ratio, num_bins, bin_width, true, SplitMix64)
    }
}

impl<H: Hasher64> FixedRateShards<H> {
    /// Creates an estimator with an explicit hasher.
    pub fn try_with_hasher(
        sampling_ratio: f64,
        num_bins: usize,
        bin_width: u64,
        adjustment: bool,
        hasher: H,
    ) -> Result<Self, ConfigError> {
        if !(sampling_ratio > 0.0 && sampling_ratio <= 1.0) {
            return Err(ConfigError::new(format!(
                "sampling ratio must be in (0, 1], got {}",
                sampling_ratio,
            )));
        }
        Ok(Self {
            olken: Olken::try_new(num_bins, bin_width)?,
            hasher,
            sampling_ratio,
            threshold: sampling_threshold(sampling_ratio),
            scale: ((1.0 / sampling_ratio) as u64).max(1),
            adjustment,
            accesses: 0,
            sampled: 0,
        })
    }

    /// Processes one access; non-sampled keys are dropped untracked.
    pub fn access(&mut self, key: u64) -> Result<(), CorruptStateError> {
        self.accesses += 1;
        if self.hasher.hash(key) > self.threshold {
            return Ok(());
        }
        self.sampled += 1;

        match self.olken.lookup(key) {
            Some(previous) => {
                let distance = self.olken.update_stack(key, previous)?;
                self.olken
                    .histogram_mut()
                    .insert_scaled_finite(distance, self.scale)
            },
            None => {
                self.olken.insert_stack(key);
                self.olken
                    .histogram_mut()
                    .insert_scaled_infinite(self.scale)
            },
        }
    }

    /// Applies the SHARDS-adj correction, if enabled.
    ///
    /// The first bin absorbs `scale · (R · accesses − sampled)`: when the
    /// realized sample undershoots expectation the histogram gains mass at
    /// distance zero, and vice versa.
    pub fn post_process(&mut self) {
        if !self.adjustment {
            return;
        }
        let expected = self.accesses as f64 * self.sampling_ratio;
        let adjustment =
            self.scale as i64 * (expected - self.sampled as f64).round() as i64;
        self.olken.histogram_mut().adjust_first_bin(adjustment);
    }

    /// Returns the accumulated histogram.
    pub fn histogram(&self) -> &Histogram {
        self.olken.histogram()
    }

    /// Returns the number of keys currently tracked.
    pub fn tracked_len(&self) -> usize {
        self.olken.tracked_len()
    }

    /// Returns a counter snapshot.
    pub fn metrics(&self) -> FixedRateShardsMetricsSnapshot {
        FixedRateShardsMetricsSnapshot {
            accesses: self.accesses,
            sampled: self.sampled,
            dropped: self.accesses - self.sampled,
            threshold: self.threshold,
            scale: self.scale,
            tracked_len: self.olken.tracked_len(),
        }
    }

    #[cfg(any(test, debug_assertions))]
    /// Validates the inner Olken state.
    pub fn debug_validate_invariants(&self) {
        self.olken.debug_validate_invariants();
    }
}

impl<H: Hasher64> ReuseDistanceEstimator for FixedRateShards<H> {
    fn access(&mut self, key: u64) -> Result<(), CorruptStateError> {
        FixedRateShards::access(self, key)
    }

    fn miss_ratio_curve(&self) -> Result<MissRatioCurve, CorruptStateError> {
        MissRatioCurve::from_histogram(self.olken.histogram())
    }

    fn num_accesses(&self) -> u64 {
        self.accesses
    }

    fn tracked_len(&self) -> usize {
        self.olken.tracked_len()
    }
}
