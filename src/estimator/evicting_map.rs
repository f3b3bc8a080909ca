//! Evicting-map estimator: SHARDS-style sampling without a tuning knob.
//!
//! The key map is replaced by an [`EvictingTable`]: a fixed array of
//! slots where each slot keeps the smallest-hash key ever offered to it.
//! Collisions act as adaptive spatial sampling (popular slots raise
//! their bar on their own), and the slot hashes double as a HyperLogLog
//! sketch whose cardinality estimate sets the histogram scale, so the
//! estimator needs no externally-chosen sampling rate to stay unbiased.
//!
//! Each access offers `(key, clock)` to the table and dispatches on the
//! outcome:
//!
//! ```text
//!   Inserted     first element in the slot      → infinite distance
//!   Replaced     smaller hash displaced the     → drop the victim's
//!                incumbent                        timestamp, infinite
//!   Updated      same key seen again            → reverse-rank distance
//!   Ignored      lost to the incumbent /        → clock tick only
//!                over the threshold
//! ```
//!
//! All histogram writes are multiplied by the current HLL-derived scale
//! (estimated distinct keys over filled slots, clamped to ≥ 1).

use crate::error::{ConfigError, CorruptStateError};
use crate::ds::{EvictingTable, SplayTree, TryPutOutcome};
use crate::hash::{Hasher64, SplitMix64};
use crate::histogram::Histogram;
use crate::metrics::EvictingMapMetricsSnapshot;
use crate::mrc::MissRatioCurve;
use crate::traits::ReuseDistanceEstimator;

/// Self-tuning sampled estimator over an evicting hash table.
///
/// # Example
///
/// ```
/// use mrckit::estimator::EvictingMap;
///
/// let mut map = EvictingMap::try_new(1.0, 1 << 8, 1 << 10, 1).unwrap();
/// for key in [7u64, 7, 7, 7] {
///     map.access(key).unwrap();
/// }
/// // Three reuses at distance zero.
/// assert_eq!(map.histogram().bins()[0], 3);
/// ```
#[derive(Debug)]
pub struct EvictingMap<H: Hasher64 = SplitMix64> {
    tree: SplayTree,
    table: EvictingTable<H>,
    histogram: Histogram,
    clock: u64,

    accesses: u64,
    inserted: u64,
    updated: u64,
    replaced: u64,
    ignored: u64,
}

impl EvictingMap<SplitMix64> {
    /// Creates an estimator with `num_slots` table slots, admitting
    /// roughly `init_sampling_ratio` of the key space at the start.
    pub fn try_new(
        init_sampling_ratio: f64,
        num_slots: usize,
        num_bins: usize,
        bin_width: u64,
    ) -> Result<Self, ConfigError> {
        Self::try_with_hasher(init_sampling_ratio, num_slots, num_bins, bin_width, SplitMix64)
    }
}

impl<H: Hasher64> EvictingMap<H> {
    /// Creates an estimator with an explicit hasher.
    pub fn try_with_hasher(
        init_sampling_ratio: f64,
        num_slots: usize,
        num_bins: usize,
        bin_width: u64,
        hasher: H,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            tree: SplayTree::new(),
            table: EvictingTable::try_with_hasher(num_slots, init_sampling_ratio, hasher)?,
            histogram: Histogram::try_new(num_bins, bin_width)?,
            clock: 0,
            accesses: 0,
            inserted: 0,
            updated: 0,
            replaced: 0,
            ignored: 0,
        })
    }

    /// Processes one access.
    pub fn access(&mut self, key: u64) -> Result<(), CorruptStateError> {
        self.accesses += 1;
        let timestamp = self.clock;
        let outcome = self.table.try_put(key, timestamp);
        match outcome {
            TryPutOutcome::Ignored => {
                self.ignored += 1;
            },
            TryPutOutcome::Inserted => {
                self.inserted += 1;
                self.tree.insert(timestamp);
                let scale = self.table.scale_factor();
                self.histogram.insert_scaled_infinite(scale)?;
            },
            TryPutOutcome::Replaced { old_value, .. } => {
                self.replaced += 1;
                if !self.tree.remove(old_value) {
                    return Err(CorruptStateError::new(
                        "displaced element's timestamp missing from the tree",
                    ));
                }
                self.tree.insert(timestamp);
                let scale = self.table.scale_factor();
                self.histogram.insert_scaled_infinite(scale)?;
            },
            TryPutOutcome::Updated { old_value } => {
                self.updated += 1;
                let distance = self.tree.reverse_rank(old_value).ok_or_else(|| {
                    CorruptStateError::new("updated element's timestamp missing from the tree")
                })?;
                if !self.tree.remove(old_value) {
                    return Err(CorruptStateError::new(
                        "updated element's timestamp vanished during refresh",
                    ));
                }
                self.tree.insert(timestamp);
                let scale = self.table.scale_factor();
                self.histogram.insert_scaled_finite(distance, scale)?;
            },
        }
        self.clock += 1;
        Ok(())
    }

    /// Returns the accumulated histogram.
    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    /// Returns the number of keys currently tracked.
    pub fn tracked_len(&self) -> usize {
        self.tree.len()
    }

    /// Returns the table's current cardinality estimate.
    pub fn cardinality(&self) -> f64 {
        self.table.cardinality()
    }

    /// Returns a counter snapshot.
    pub fn metrics(&self) -> EvictingMapMetricsSnapshot {
        EvictingMapMetricsSnapshot {
            accesses: self.accesses,
            inserted: self.inserted,
            updated: self.updated,
            replaced: self.replaced,
            ignored: self.ignored,
            threshold: self.table.threshold(),
            scale: self.table.scale_factor(),
            tracked_len: self.tree.len(),
        }
    }

    #[cfg(any(test, debug_assertions))]
    /// Validates that the tree tracks exactly the occupied slots.
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.tree.len(), self.table.num_inserted());
        self.histogram.debug_validate_invariants();
    }
}

impl<H: Hasher64> ReuseDistanceEstimator for EvictingMap<H> {
    fn access(&mut self, key: u64) -> Result<(), CorruptStateError> {
        EvictingMap::access(self, key)
    }

    fn miss_ratio_curve(&self) -> Result<MissRatioCurve, CorruptStateError> {
        MissRatioCurve::from_histogram(&self.histogram)
    }

    fn num_accesses(&self) -> u64 {
        self.accesses
    }

    fn tracked_len(&self) -> usize {
        self.tree.len()
    }
}
