//! Olken's exact LRU reuse-distance estimator.
//!
//! The baseline every sampled estimator is judged against. State is a
//! key→timestamp map, an order-statistic tree of the live timestamps, and
//! an integer histogram; the logical clock ticks once per access.
//!
//! ## Access Flow
//!
//! ```text
//!   access(key)
//!        │
//!        ▼
//!   ┌────────────────────────────────────────────────────────────────┐
//!   │ map has key?                                                   │
//!   │   HIT  → distance = tree.reverse_rank(previous timestamp)      │
//!   │          tree.remove(previous); tree.insert(now)               │
//!   │          histogram.insert_finite(distance)                     │
//!   │   MISS → tree.insert(now)                                      │
//!   │          histogram.insert_infinite()                           │
//!   └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The reverse rank, the number of timestamps younger than the key's
//! previous one, is exactly the number of distinct keys touched since,
//! i.e. the LRU stack distance.
//!
//! A remove that fails on a timestamp the map vouches for is a fatal
//! [`CorruptStateError`]: the map/tree pair has diverged and the
//! histogram can no longer be trusted.
//!
//! The sampled estimators reuse this type through the finer-grained
//! [`lookup`](Olken::lookup) / [`update_stack`](Olken::update_stack) /
//! [`insert_stack`](Olken::insert_stack) / [`remove_item`](Olken::remove_item)
//! operations, applying their own scaling to the histogram writes.

use rustc_hash::FxHashMap;

use crate::error::{ConfigError, CorruptStateError};
use crate::ds::SplayTree;
use crate::histogram::Histogram;
use crate::metrics::OlkenMetricsSnapshot;
use crate::mrc::MissRatioCurve;
use crate::traits::ReuseDistanceEstimator;

/// Exact reuse-distance estimator.
///
/// # Example
///
/// ```
/// use mrckit::estimator::Olken;
///
/// let mut olken = Olken::try_new(16, 1).unwrap();
/// for key in [1u64, 2, 1, 3, 2] {
///     olken.access(key).unwrap();
/// }
/// // Key 1 reused over {2}; key 2 reused over {1, 3}.
/// assert_eq!(olken.histogram().bins()[1], 1);
/// assert_eq!(olken.histogram().bins()[2], 1);
/// assert_eq!(olken.histogram().infinity(), 3);
/// ```
#[derive(Debug)]
pub struct Olken {
    tree: SplayTree,
    map: FxHashMap<u64, u64>,
    histogram: Histogram,
    clock: u64,

    accesses: u64,
    hits: u64,
    misses: u64,
}

impl Olken {
    /// Creates an estimator with the given histogram geometry.
    pub fn try_new(num_bins: usize, bin_width: u64) -> Result<Self, ConfigError> {
        Ok(Self {
            tree: SplayTree::new(),
            map: FxHashMap::default(),
            histogram: Histogram::try_new(num_bins, bin_width)?,
            clock: 0,
            accesses: 0,
            hits: 0,
            misses: 0,
        })
    }

    /// Processes one access.
    pub fn access(&mut self, key: u64) -> Result<(), CorruptStateError> {
        self.accesses += 1;
        match self.lookup(key) {
            Some(previous) => {
                self.hits += 1;
                let distance = self.update_stack(key, previous)?;
                self.histogram.insert_finite(distance)
            },
            None => {
                self.misses += 1;
                self.insert_stack(key);
                self.histogram.insert_infinite()
            },
        }
    }

    /// Returns the key's current timestamp, if tracked.
    pub fn lookup(&self, key: u64) -> Option<u64> {
        self.map.get(&key).copied()
    }

    /// Refreshes a tracked key's recency and returns its stack distance.
    ///
    /// `previous` must be the timestamp [`lookup`](Self::lookup) returned
    /// for `key`; the histogram is left untouched so callers can apply
    /// their own scale.
    pub fn update_stack(&mut self, key: u64, previous: u64) -> Result<u64, CorruptStateError> {
        let distance = self.tree.reverse_rank(previous).ok_or_else(|| {
            CorruptStateError::new("mapped timestamp missing from the tree")
        })?;
        if !self.tree.remove(previous) {
            return Err(CorruptStateError::new(
                "mapped timestamp vanished during refresh",
            ));
        }
        self.tree.insert(self.clock);
        self.map.insert(key, self.clock);
        self.clock += 1;
        Ok(distance)
    }

    /// Starts tracking a new key at the current clock.
    pub fn insert_stack(&mut self, key: u64) {
        self.map.insert(key, self.clock);
        self.tree.insert(self.clock);
        self.clock += 1;
    }

    /// Stops tracking `key` entirely (sampler eviction path).
    pub fn remove_item(&mut self, key: u64) -> Result<(), CorruptStateError> {
        let timestamp = self.map.remove(&key).ok_or_else(|| {
            CorruptStateError::new("evicted key was not tracked")
        })?;
        if !self.tree.remove(timestamp) {
            return Err(CorruptStateError::new(
                "evicted key's timestamp missing from the tree",
            ));
        }
        Ok(())
    }

    /// Advances the clock for an access that was dropped by sampling, so
    /// sampled timelines stay aligned with the oracle's.
    pub fn ignore(&mut self) {
        self.clock += 1;
    }

    /// Returns the accumulated histogram.
    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    /// Returns a mutable handle for scaled sampler writes.
    pub(crate) fn histogram_mut(&mut self) -> &mut Histogram {
        &mut self.histogram
    }

    /// Returns the number of tracked keys.
    pub fn tracked_len(&self) -> usize {
        self.map.len()
    }

    /// Returns the current logical clock.
    pub fn clock(&self) -> u64 {
        self.clock
    }

    /// Returns a counter snapshot.
    pub fn metrics(&self) -> OlkenMetricsSnapshot {
        OlkenMetricsSnapshot {
            accesses: self.accesses,
            hits: self.hits,
            misses: self.misses,
            tracked_len: self.map.len(),
        }
    }

    #[cfg(any(test, debug_assertions))]
    /// Validates the tree/map pairing and histogram accounting.
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.map.len(), self.tree.len());
        for (&key, &timestamp) in &self.map {
            assert!(
                self.tree.contains(timestamp),
                "key {} maps to timestamp {} not in the tree",
                key,
                timestamp
            );
        }
        self.histogram.debug_validate_invariants();
    }
}

impl ReuseDistanceEstimator for Olken {
    fn access(&mut self, key: u64) -> Result<(), CorruptStateError> {
        Olken::access(self, key)
    }

    fn miss_ratio_curve(&self) -> Result<MissRatioCurve, CorruptStateError> {
        MissRatioCurve::from_histogram(&self.histogram)
    }

    fn num_accesses(&self) -> u64 {
        self.accesses
    }

    fn tracked_len(&self) -> usize {
        self.map.len()
    }
}
