//! Fixed-size SHARDS: bounded-sample hash filtering.
//!
//! Fixed-rate SHARDS has no memory bound: skewed traces can admit
//! millions of keys. This variant caps the tracked sample at `max_tracked`
//! keys by keeping them in a max-heap ordered by hash. When a new key
//! arrives and the sample is full, the *entire group* sharing the largest
//! hash is evicted (from the heap and from the inner Olken stack), and
//! that departed maximum becomes the new admission threshold:
//!
//! ```text
//!   threshold₀ = ⌊R₀ · 2⁶⁴⌋
//!        │  sample fills up
//!        ▼
//!   evict all keys with hash == heap max     ──┐  repeated rounds:
//!   threshold ← new heap max (strictly lower)  │  threshold only ever
//!   scale     ← ⌊2⁶⁴ / threshold⌋              │  tightens, scale only
//!        │                                   ──┘  ever grows
//!        ▼
//!   admit iff hash ≤ threshold
//! ```
//!
//! Evicting the whole tied group is what guarantees the strict decrease:
//! a key with `hash == threshold` is still admissible, so leaving part of
//! the group behind would let the sample exceed its bound.
//!
//! The scale is the inverse of the *effective* sampling ratio
//! `threshold / 2⁶⁴`, the Waldspurger adjustment applied per insertion
//! rather than after the fact.

use crate::error::{ConfigError, CorruptStateError};
use crate::ds::BoundedMaxHeap;
use crate::hash::{sampling_threshold, Hasher64, SplitMix64};
use crate::histogram::Histogram;
use crate::metrics::FixedSizeShardsMetricsSnapshot;
use crate::mrc::MissRatioCurve;
use crate::traits::ReuseDistanceEstimator;

use super::olken::Olken;

/// Bounded-sample SHARDS estimator.
///
/// # Example
///
/// ```
/// use mrckit::estimator::FixedSizeShards;
///
/// let mut shards = FixedSizeShards::try_new(1.0, 100, 1 << 10, 1).unwrap();
/// for key in 0..1000u64 {
///     shards.access(key).unwrap();
/// }
/// // The sample never outgrows its bound.
/// assert!(shards.tracked_len() <= 100);
/// ```
#[derive(Debug)]
pub struct FixedSizeShards<H: Hasher64 = SplitMix64> {
    olken: Olken,
    heap: BoundedMaxHeap,
    hasher: H,
    threshold: u64,
    scale: u64,

    accesses: u64,
    sampled: u64,
    evicted: u64,
    eviction_rounds: u64,
}

impl FixedSizeShards<SplitMix64> {
    /// Creates an estimator starting at `sampling_ratio` with at most
    /// `max_tracked` sampled keys, hashing with splitmix64.
    pub fn try_new(
        sampling_ratio: f64,
        max_tracked: usize,
        num_bins: usize,
        bin_width: u64,
    ) -> Result<Self, ConfigError> {
        Self::try_with_hasher(sampling_ratio, max_tracked, num_bins, bin_width, SplitMix64)
    }
}

impl<H: Hasher64> FixedSizeShards<H> {
    /// Creates an estimator with an explicit hasher.
    pub fn try_with_hasher(
        sampling_ratio: f64,
        max_tracked: usize,
        num_bins: usize,
        bin_width: u64,
        hasher: H,
    ) -> Result<Self, ConfigError> {
        if !(sampling_ratio > 0.0 && sampling_ratio <= 1.0) {
            return Err(ConfigError::new(format!(
                "sampling ratio must be in (0, 1], got {}",
                sampling_ratio,
            )));
        }
        if max_tracked == 0 {
            return Err(ConfigError::new("max tracked keys must be > 0"));
        }
        Ok(Self {
            olken: Olken::try_new(num_bins, bin_width)?,
            heap: BoundedMaxHeap::new(max_tracked),
            hasher,
            threshold: sampling_threshold(sampling_ratio),
            scale: ((1.0 / sampling_ratio) as u64).max(1),
            accesses: 0,
            sampled: 0,
            evicted: 0,
            eviction_rounds: 0,
        })
    }

    /// Processes one access; non-sampled keys only advance the clock.
    pub fn access(&mut self, key: u64) -> Result<(), CorruptStateError> {
        self.accesses += 1;
        let hash = self.hasher.hash(key);
        if hash > self.threshold {
            self.olken.ignore();
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
                if self.heap.is_full() {
                    self.make_room()?;
                }
                self.heap.try_insert(hash, key);
                self.olken.insert_stack(key);
                self.olken
                    .histogram_mut()
                    .insert_scaled_infinite(self.scale)
            },
        }
    }

    /// Evicts the max-hash group and tightens the threshold.
    fn make_room(&mut self) -> Result<(), CorruptStateError> {
        let (max_hash, _) = self.heap.peek_max().ok_or_else(|| {
            CorruptStateError::new("full sample heap has no maximum")
        })?;
        while self.heap.peek_max().map(|(hash, _)| hash) == Some(max_hash) {
            let (_, victim) = self.heap.pop_max().expect("peeked entry vanished");
            self.olken.remove_item(victim)?;
            self.evicted += 1;
        }
        self.eviction_rounds += 1;
        if let Some((new_max, _)) = self.heap.peek_max() {
            self.threshold = new_max;
            self.scale = u64::MAX / new_max.max(1);
        }
        Ok(())
    }

    /// Returns the accumulated histogram.
    pub fn histogram(&self) -> &Histogram {
        self.olken.histogram()
    }

    /// Returns the current admission threshold.
    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Returns the current per-insertion scale.
    pub fn scale(&self) -> u64 {
        self.scale
    }

    /// Returns the number of keys currently tracked.
    pub fn tracked_len(&self) -> usize {
        self.olken.tracked_len()
    }

    /// Returns a counter snapshot.
    pub fn metrics(&self) -> FixedSizeShardsMetricsSnapshot {
        FixedSizeShardsMetricsSnapshot {
            accesses: self.accesses,
            sampled: self.sampled,
            dropped: self.accesses - self.sampled,
            evicted: self.evicted,
            eviction_rounds: self.eviction_rounds,
            threshold: self.threshold,
            scale: self.scale,
            tracked_len: self.olken.tracked_len(),
        }
    }

    #[cfg(any(test, debug_assertions))]
    /// Validates that the heap and the Olken stack track the same keys.
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.heap.len(), self.olken.tracked_len());
        assert!(self.scale >= 1);
        self.olken.debug_validate_invariants();
    }
}

impl<H: Hasher64> ReuseDistanceEstimator for FixedSizeShards<H> {
    fn access(&mut self, key: u64) -> Result<(), CorruptStateError> {
        FixedSizeShards::access(self, key)
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
