//! Circular recency buckets for the Mimir estimator.
//!
//! A ring of `B` counters indexed by *logical* bucket numbers: the valid
//! window is always the `B` consecutive indices `[oldest, oldest + B)`,
//! stored physically at `index % B`. Each tracked key sits in one bucket;
//! the newer the bucket, the more recently the key was touched. A key's
//! stack distance is then known only to lie between "entries in buckets
//! newer than mine" and "that plus my own bucket's population", which is
//! exactly the span the fractional histogram spreads an access over.
//!
//! ```text
//!           oldest                                   newest
//!             │                                         │
//!   logical:  7     8     9     10    11    12    13    14      (B = 8)
//!             ▼                                         ▼
//!   counts: [ 3 ] [ 0 ] [ 2 ] [ 5 ] [ 1 ] [ 4 ] [ 0 ] [ 9 ]
//!   physical index = logical % 8
//!
//!   num_unique     = Σ counts            (mass conservation)
//!   sum_of_indices = Σ logical·count     (stacker's pivot finder)
//! ```
//!
//! Two aging policies redistribute mass when the newest bucket outgrows
//! its fair share:
//!
//! - **Rounder**: rotate. The oldest bucket's contents shift one index
//!   newer, then the window advances; the vacated physical cell becomes
//!   the new newest bucket.
//! - **Stacker**: compact. Every bucket from the average-index pivot up
//!   merges into its next-older neighbour; the window stays put.
//!
//! Both preserve `num_unique` and keep `sum_of_indices` consistent with
//! the per-bucket counts.

use crate::error::{ConfigError, CorruptStateError};

/// Ring of `B` recency buckets with logical indices.
///
/// # Example
///
/// ```
/// use mrckit::ds::MimirBuckets;
///
/// let mut buckets = MimirBuckets::try_new(4).unwrap();
/// buckets.increment_newest();
/// buckets.note_unique();
/// let newest = buckets.newest_index();
/// let (start, range) = buckets.stack_distance(newest).unwrap();
/// assert_eq!((start, range), (0, 1));
/// ```
#[derive(Debug, Clone)]
pub struct MimirBuckets {
    counts: Vec<u64>,
    newest: u64,
    oldest: u64,
    num_unique: u64,
    sum_of_indices: u64,
}

impl MimirBuckets {
    /// Creates a ring of `num_buckets` empty buckets.
    pub fn try_new(num_buckets: usize) -> Result<Self, ConfigError> {
        if num_buckets == 0 {
            return Err(ConfigError::new("bucket count must be > 0"));
        }
        Ok(Self {
            counts: vec![0; num_buckets],
            newest: num_buckets as u64 - 1,
            oldest: 0,
            num_unique: 0,
            sum_of_indices: 0,
        })
    }

    /// Returns the number of buckets.
    pub fn num_buckets(&self) -> usize {
        self.counts.len()
    }

    /// Returns the newest logical bucket index.
    pub fn newest_index(&self) -> u64 {
        self.newest
    }

    /// Returns the oldest logical bucket index.
    pub fn oldest_index(&self) -> u64 {
        self.oldest
    }

    /// Returns the number of tracked entries.
    pub fn num_unique(&self) -> u64 {
        self.num_unique
    }

    /// Returns the population of the logical bucket `index`.
    pub fn count_at(&self, index: u64) -> u64 {
        self.counts[self.physical(index)]
    }

    /// Records one more tracked entry (first access of a key).
    pub fn note_unique(&mut self) {
        self.num_unique += 1;
    }

    /// Adds one entry to the newest bucket.
    pub fn increment_newest(&mut self) {
        let idx = self.physical(self.newest);
        self.counts[idx] += 1;
        self.sum_of_indices += self.newest;
    }

    /// Removes one entry from the logical bucket `index`.
    pub fn decrement(&mut self, index: u64) -> Result<(), CorruptStateError> {
        if index > self.newest {
            return Err(CorruptStateError::new(
                "bucket index newer than the newest bucket",
            ));
        }
        let idx = self.physical(index);
        self.counts[idx] = self
            .counts[idx]
            .checked_sub(1)
            .ok_or_else(|| CorruptStateError::new("decrement of an empty bucket"))?;
        self.sum_of_indices -= index;
        Ok(())
    }

    /// Returns the stack-distance span for an entry in bucket `index`:
    /// the population of strictly newer buckets, and the population of the
    /// entry's own bucket.
    ///
    /// Indices that predate the window (rounder aging moved past them)
    /// are clamped to the oldest bucket.
    pub fn stack_distance(&self, index: u64) -> Result<(u64, u64), CorruptStateError> {
        if index > self.newest {
            return Err(CorruptStateError::new(
                "bucket index newer than the newest bucket",
            ));
        }
        let index = index.max(self.oldest);
        let mut start = 0;
        for i in (index + 1)..=self.newest {
            start += self.counts[self.physical(i)];
        }
        Ok((start, self.counts[self.physical(index)]))
    }

    /// Returns `true` when the newest bucket holds more than its fair
    /// share, `ceil(num_unique / B)`, and aging should run.
    pub fn newest_over_fair_share(&self) -> bool {
        if self.num_unique == 0 {
            return false;
        }
        let fair_share = 1 + (self.num_unique - 1) / self.counts.len() as u64;
        self.count_at(self.newest) > fair_share
    }

    /// Rounder aging: rotate the window one bucket forward.
    ///
    /// The oldest bucket's entries become one step newer, and the physical
    /// cell they vacate turns into the new (empty) newest bucket.
    pub fn age_rounder(&mut self) {
        let old_idx = self.physical(self.oldest);
        let new_idx = self.physical(self.oldest + 1);
        let moved = self.counts[old_idx];
        self.sum_of_indices += moved;
        if new_idx != old_idx {
            self.counts[new_idx] += moved;
            self.counts[old_idx] = 0;
        }
        self.oldest += 1;
        self.newest += 1;
    }

    /// Stacker aging: merge every bucket from the average-index pivot
    /// upward into its next-older neighbour.
    ///
    /// The pivot is `sum_of_indices / num_unique`. Stored map indices are
    /// deliberately left alone: the window does not move, so they remain
    /// valid positions in the rearranged ring.
    pub fn age_stacker(&mut self) {
        if self.num_unique == 0 {
            return;
        }
        let pivot = self.sum_of_indices / self.num_unique;
        if pivot <= self.oldest {
            return;
        }
        debug_assert!(self.newest - pivot <= self.counts.len() as u64 - 1);
        for i in pivot..=self.newest {
            let new_idx = self.physical(i - 1);
            let old_idx = self.physical(i);
            let moved = self.counts[old_idx];
            self.counts[new_idx] += moved;
            self.sum_of_indices -= moved;
            self.counts[old_idx] = 0;
        }
    }

    #[inline]
    fn physical(&self, index: u64) -> usize {
        (index % self.counts.len() as u64) as usize
    }

    #[cfg(any(test, debug_assertions))]
    /// Validates window geometry, mass conservation, and the index
    /// accumulator.
    pub fn debug_validate_invariants(&self) {
        let num_buckets = self.counts.len() as u64;
        assert_eq!(self.newest + 1 - num_buckets, self.oldest);
        let mass: u64 = self.counts.iter().sum();
        assert_eq!(mass, self.num_unique, "bucket mass != num_unique");
        let weighted: u64 = (self.oldest..=self.newest)
            .map(|i| i * self.counts[self.physical(i)])
            .sum();
        assert_eq!(weighted, self.sum_of_indices, "index accumulator stale");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(num_buckets: usize, per_bucket: &[u64]) -> MimirBuckets {
        // Populate oldest-to-newest by rotating entries through the newest
        // bucket the way the estimator would, then hand-place the counts.
        let mut buckets = MimirBuckets::try_new(num_buckets).unwrap();
        for (offset, &count) in per_bucket.iter().enumerate() {
            let index = buckets.oldest_index() + offset as u64;
            for _ in 0..count {
                buckets.counts[(index % num_buckets as u64) as usize] += 1;
                buckets.sum_of_indices += index;
                buckets.num_unique += 1;
            }
        }
        buckets.debug_validate_invariants();
        buckets
    }

    #[test]
    fn mimir_buckets_reject_zero_buckets() {
        assert!(MimirBuckets::try_new(0).is_err());
    }

    #[test]
    fn mimir_buckets_track_mass_and_indices() {
        let mut buckets = MimirBuckets::try_new(4).unwrap();
        for _ in 0..3 {
            buckets.increment_newest();
            buckets.note_unique();
        }
        assert_eq!(buckets.num_unique(), 3);
        assert_eq!(buckets.count_at(buckets.newest_index()), 3);
        buckets.debug_validate_invariants();

        buckets.decrement(buckets.newest_index()).unwrap();
        buckets.num_unique -= 1; // entry left entirely (test bookkeeping)
        buckets.debug_validate_invariants();
    }

    #[test]
    fn mimir_buckets_stack_distance_spans_newer_buckets() {
        let buckets = filled(4, &[2, 3, 1, 4]);
        let oldest = buckets.oldest_index();
        // Entry in the oldest bucket: 8 entries are strictly newer.
        assert_eq!(buckets.stack_distance(oldest).unwrap(), (8, 2));
        // Entry in the newest bucket: none are newer.
        assert_eq!(buckets.stack_distance(oldest + 3).unwrap(), (0, 4));
        // Middle bucket.
        assert_eq!(buckets.stack_distance(oldest + 1).unwrap(), (5, 3));
    }

    #[test]
    fn mimir_buckets_stack_distance_clamps_stale_indices() {
        let mut buckets = filled(4, &[2, 3, 1, 4]);
        buckets.age_rounder();
        buckets.debug_validate_invariants();
        // An index that predates the window behaves like the oldest bucket.
        let stale = buckets.oldest_index() - 1;
        assert_eq!(
            buckets.stack_distance(stale).unwrap(),
            buckets.stack_distance(buckets.oldest_index()).unwrap()
        );
    }

    #[test]
    fn mimir_buckets_stack_distance_rejects_future_indices() {
        let buckets = filled(4, &[1, 1, 1, 1]);
        assert!(buckets.stack_distance(buckets.newest_index() + 1).is_err());
    }

    #[test]
    fn mimir_buckets_rounder_rotates_window() {
        let mut buckets = filled(4, &[2, 3, 1, 4]);
        let oldest_before = buckets.oldest_index();
        buckets.age_rounder();

        assert_eq!(buckets.oldest_index(), oldest_before + 1);
        assert_eq!(buckets.newest_index(), oldest_before + 4);
        // Old oldest merged into its newer neighbour; new newest is empty.
        assert_eq!(buckets.count_at(buckets.oldest_index()), 5);
        assert_eq!(buckets.count_at(buckets.newest_index()), 0);
        assert_eq!(buckets.num_unique(), 10);
        buckets.debug_validate_invariants();
    }

    #[test]
    fn mimir_buckets_stacker_compacts_younger_half() {
        let mut buckets = filled(4, &[1, 1, 1, 7]);
        let oldest = buckets.oldest_index();
        // sum = 0·1 + 1·1 + 2·1 + 3·7 = 24; pivot = 24 / 10 = 2.
        buckets.age_stacker();

        assert_eq!(buckets.oldest_index(), oldest); // window unmoved
        assert_eq!(buckets.count_at(oldest), 1);
        assert_eq!(buckets.count_at(oldest + 1), 2);
        assert_eq!(buckets.count_at(oldest + 2), 7);
        assert_eq!(buckets.count_at(oldest + 3), 0);
        assert_eq!(buckets.num_unique(), 10);
        buckets.debug_validate_invariants();
    }

    #[test]
    fn mimir_buckets_stacker_noop_when_pivot_at_oldest() {
        // All mass in the oldest bucket keeps the pivot at the window start.
        let mut buckets = filled(4, &[5, 0, 0, 0]);
        let before = buckets.clone();
        buckets.age_stacker();
        assert_eq!(buckets.counts, before.counts);
        buckets.debug_validate_invariants();
    }

    #[test]
    fn mimir_buckets_fair_share_uses_ceiling() {
        let mut buckets = MimirBuckets::try_new(4).unwrap();
        // 5 uniques over 4 buckets: fair share is ceil(5/4) = 2.
        for _ in 0..5 {
            buckets.increment_newest();
            buckets.note_unique();
        }
        assert!(buckets.newest_over_fair_share());

        let buckets = filled(4, &[2, 1, 0, 2]);
        // fair share = ceil(5/4) = 2; newest holds exactly 2.
        assert!(!buckets.newest_over_fair_share());
    }

    #[test]
    fn mimir_buckets_single_bucket_degenerates_safely() {
        let mut buckets = MimirBuckets::try_new(1).unwrap();
        for _ in 0..10 {
            buckets.increment_newest();
            buckets.note_unique();
        }
        // One bucket holds everything and never exceeds its fair share.
        assert!(!buckets.newest_over_fair_share());
        let (start, range) = buckets.stack_distance(buckets.newest_index()).unwrap();
        assert_eq!((start, range), (0, 10));

        // Direct aging must not destroy mass even in the degenerate ring.
        buckets.age_rounder();
        assert_eq!(buckets.num_unique(), 10);
        let newest = buckets.newest_index();
        assert_eq!(buckets.count_at(newest), 10);
        buckets.debug_validate_invariants();
    }
}
