//! Mimir: bucketed approximate reuse-distance estimation.
//!
//! Instead of exact timestamps, each tracked key carries only the index
//! of a recency bucket. On a re-reference the stack distance is known to
//! lie between "entries in buckets newer than mine" and "that plus my own
//! bucket", so one access is spread fractionally across that span. The
//! result is a fractional histogram at a fraction of Olken's bookkeeping
//! cost, with resolution set by the bucket count.
//!
//! When the newest bucket collects more than its fair share of entries,
//! an aging policy redistributes them:
//!
//! - [`MimirAgingPolicy::Rounder`] rotates the window (old entries get
//!   folded toward the young end; stale stored indices are clamped to the
//!   window on their next hit).
//! - [`MimirAgingPolicy::Stacker`] compacts the younger half in place;
//!   stored indices stay valid because the window never moves.
//!
//! With a single bucket the estimator degenerates into a pure cardinality
//! counter: every reuse spans the whole population and only the infinity
//! counter carries structure.

use rustc_hash::FxHashMap;

use crate::error::{ConfigError, CorruptStateError};
use crate::ds::MimirBuckets;
use crate::histogram::FractionalHistogram;
use crate::metrics::MimirMetricsSnapshot;
use crate::mrc::MissRatioCurve;
use crate::traits::ReuseDistanceEstimator;

/// How Mimir redistributes bucket populations when the newest bucket
/// overflows its fair share.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MimirAgingPolicy {
    /// Rotate the bucket window: oldest contents shift one step newer and
    /// the vacated cell becomes the new newest bucket.
    Rounder,
    /// Compact the younger half: buckets above the average-index pivot
    /// merge into their next-older neighbours.
    Stacker,
}

/// Bucketed approximate estimator.
///
/// # Example
///
/// ```
/// use mrckit::estimator::{Mimir, MimirAgingPolicy};
///
/// let mut mimir = Mimir::try_new(8, MimirAgingPolicy::Rounder, 64, 1).unwrap();
/// for key in [1u64, 2, 3, 1, 2, 3] {
///     mimir.access(key).unwrap();
/// }
/// assert_eq!(mimir.histogram().infinity(), 3);
/// assert_eq!(mimir.histogram().running_sum(), 6);
/// ```
#[derive(Debug)]
pub struct Mimir {
    buckets: MimirBuckets,
    map: FxHashMap<u64, u64>,
    histogram: FractionalHistogram,
    aging: MimirAgingPolicy,

    accesses: u64,
    hits: u64,
    misses: u64,
    agings: u64,
}

impl Mimir {
    /// Creates an estimator with `num_buckets` recency buckets.
    pub fn try_new(
        num_buckets: usize,
        aging: MimirAgingPolicy,
        num_bins: usize,
        bin_width: u64,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            buckets: MimirBuckets::try_new(num_buckets)?,
            map: FxHashMap::default(),
            histogram: FractionalHistogram::try_new(num_bins, bin_width)?,
            aging,
            accesses: 0,
            hits: 0,
            misses: 0,
            agings: 0,
        })
    }

    /// Processes one access.
    pub fn access(&mut self, key: u64) -> Result<(), CorruptStateError> {
        self.accesses += 1;
        match self.map.get(&key).copied() {
            Some(stored) => {
                self.hits += 1;
                // Rounder aging may have advanced the window past the
                // stored index; the entry physically lives in the oldest
                // bucket then.
                let mut bucket = stored.max(self.buckets.oldest_index());
                // Stacker aging shifts bucket contents toward the older
                // end without updating stored indices; chase the mass down
                // to the bucket that actually holds it.
                if self.aging == MimirAgingPolicy::Stacker {
                    while bucket > self.buckets.oldest_index()
                        && self.buckets.count_at(bucket) == 0
                    {
                        bucket -= 1;
                    }
                }
                let (start, range) = self.buckets.stack_distance(bucket)?;
                self.histogram.insert_fractional_range(start, range, 1)?;
                self.buckets.decrement(bucket)?;
                self.buckets.increment_newest();
                self.map.insert(key, self.buckets.newest_index());
            },
            None => {
                self.misses += 1;
                self.buckets.increment_newest();
                self.buckets.note_unique();
                self.map.insert(key, self.buckets.newest_index());
                self.histogram.insert_infinite(1)?;
            },
        }
        if self.buckets.newest_over_fair_share() {
            self.agings += 1;
            match self.aging {
                MimirAgingPolicy::Rounder => self.buckets.age_rounder(),
                MimirAgingPolicy::Stacker => self.buckets.age_stacker(),
            }
        }
        Ok(())
    }

    /// Returns the accumulated fractional histogram.
    pub fn histogram(&self) -> &FractionalHistogram {
        &self.histogram
    }

    /// Returns the configured aging policy.
    pub fn aging_policy(&self) -> MimirAgingPolicy {
        self.aging
    }

    /// Returns the number of tracked keys.
    pub fn tracked_len(&self) -> usize {
        self.map.len()
    }

    /// Returns a counter snapshot.
    pub fn metrics(&self) -> MimirMetricsSnapshot {
        MimirMetricsSnapshot {
            accesses: self.accesses,
            hits: self.hits,
            misses: self.misses,
            agings: self.agings,
            num_unique: self.buckets.num_unique(),
        }
    }

    #[cfg(any(test, debug_assertions))]
    /// Validates bucket mass conservation and map/bucket agreement.
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.map.len() as u64, self.buckets.num_unique());
        self.buckets.debug_validate_invariants();
        self.histogram.debug_validate_invariants();
    }
}

impl ReuseDistanceEstimator for Mimir {
    fn access(&mut self, key: u64) -> Result<(), CorruptStateError> {
        Mimir::access(self, key)
    }

    fn miss_ratio_curve(&self) -> Result<MissRatioCurve, CorruptStateError> {
        MissRatioCurve::from_fractional_histogram(&self.histogram)
    }

    fn num_accesses(&self) -> u64 {
        self.accesses
    }

    fn tracked_len(&self) -> usize {
        self.map.len()
    }
}
