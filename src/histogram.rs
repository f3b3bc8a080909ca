//! Reuse-distance histograms with overflow and infinity accounting.
//!
//! Both estimator families accumulate into the same shape: `num_bins`
//! fixed-width bins, an overflow counter for finite distances past the last
//! bin (the "false infinity"), an infinity counter for first accesses, and
//! a running sum tying them together. The invariant every operation
//! preserves:
//!
//! ```text
//!   sum(bins) + overflow + infinity == running_sum == accesses recorded
//! ```
//!
//! [`Histogram`] holds integer counts and serves the exact and
//! hash-sampled estimators; sampled inserts apply the Waldspurger
//! adjustment, scaling the distance horizontally and the count vertically
//! by the same factor. [`FractionalHistogram`] holds `f64` counts for
//! estimators that only know a distance lies somewhere within a span and
//! spread one access across it.
//!
//! Counter arithmetic is checked: an increment that would exceed the `u64`
//! range is a [`CorruptStateError`], not a silent wrap.

use crate::error::{ConfigError, CorruptStateError};

#[inline]
fn checked_acc(counter: &mut u64, amount: u64) -> Result<(), CorruptStateError> {
    *counter = counter
        .checked_add(amount)
        .ok_or_else(|| CorruptStateError::new("histogram counter overflow"))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Histogram (integer bins)
// ---------------------------------------------------------------------------

/// Integer-binned reuse-distance histogram.
///
/// # Example
///
/// ```
/// use mrckit::histogram::Histogram;
///
/// let mut hist = Histogram::try_new(4, 1).unwrap();
/// hist.insert_finite(0).unwrap();
/// hist.insert_finite(2).unwrap();
/// hist.insert_finite(9).unwrap(); // past the last bin -> overflow
/// hist.insert_infinite().unwrap();
///
/// assert_eq!(hist.bins(), &[1, 0, 1, 0]);
/// assert_eq!(hist.overflow(), 1);
/// assert_eq!(hist.infinity(), 1);
/// assert_eq!(hist.running_sum(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    bins: Vec<u64>,
    bin_width: u64,
    overflow: u64,
    infinity: u64,
    running_sum: u64,
}

impl Histogram {
    /// Creates a histogram with `num_bins` bins of `bin_width` entries each.
    pub fn try_new(num_bins: usize, bin_width: u64) -> Result<Self, ConfigError> {
        if num_bins == 0 {
            return Err(ConfigError::new("histogram needs at least one bin"));
        }
        if bin_width == 0 {
            return Err(ConfigError::new("histogram bin width must be > 0"));
        }
        Ok(Self {
            bins: vec![0; num_bins],
            bin_width,
            overflow: 0,
            infinity: 0,
            running_sum: 0,
        })
    }

    /// Records one access at an exact reuse distance.
    pub fn insert_finite(&mut self, distance: u64) -> Result<(), CorruptStateError> {
        self.insert_scaled_finite(distance, 1)
    }

    /// Records a sampled access at reuse distance `distance` with scale
    /// `scale`.
    ///
    /// The Waldspurger adjustment: a distance observed under spatial
    /// sampling at rate `1/scale` stands for a true distance `scale` times
    /// larger, carrying the weight of `scale` accesses. The scaled distance
    /// saturates, which lands impossible magnitudes in the overflow bucket
    /// rather than wrapping.
    pub fn insert_scaled_finite(
        &mut self,
        distance: u64,
        scale: u64,
    ) -> Result<(), CorruptStateError> {
        let scaled = distance.saturating_mul(scale);
        let idx = scaled / self.bin_width;
        if (idx as usize) < self.bins.len() {
            checked_acc(&mut self.bins[idx as usize], scale)?;
        } else {
            checked_acc(&mut self.overflow, scale)?;
        }
        checked_acc(&mut self.running_sum, scale)
    }

    /// Records one first access (infinite reuse distance).
    pub fn insert_infinite(&mut self) -> Result<(), CorruptStateError> {
        self.insert_scaled_infinite(1)
    }

    /// Records a sampled first access with scale `scale`.
    pub fn insert_scaled_infinite(&mut self, scale: u64) -> Result<(), CorruptStateError> {
        checked_acc(&mut self.infinity, scale)?;
        checked_acc(&mut self.running_sum, scale)
    }

    /// Applies a signed correction to the first bin, clamped at zero.
    ///
    /// This is the SHARDS-adj step: after a fixed-rate run, the difference
    /// between the expected and actual sampled counts (times the scale) is
    /// folded into the smallest-distance bin. The running sum moves by the
    /// amount actually applied.
    pub fn adjust_first_bin(&mut self, adjustment: i64) {
        let current = self.bins[0] as i128 + adjustment as i128;
        let applied = current.max(0) as u64;
        let delta = applied as i128 - self.bins[0] as i128;
        self.bins[0] = applied;
        self.running_sum = (self.running_sum as i128 + delta).max(0) as u64;
    }

    /// Adds `other`'s counts bin-wise; geometries must match.
    ///
    /// This is the merge step for independently-run shards after all
    /// writers have quiesced.
    pub fn merge(&mut self, other: &Histogram) -> Result<(), ConfigError> {
        if self.bins.len() != other.bins.len() || self.bin_width != other.bin_width {
            return Err(ConfigError::new(format!(
                "histogram geometry mismatch: {}x{} vs {}x{}",
                self.bins.len(),
                self.bin_width,
                other.bins.len(),
                other.bin_width,
            )));
        }
        for (bin, &add) in self.bins.iter_mut().zip(other.bins.iter()) {
            *bin += add;
        }
        self.overflow += other.overflow;
        self.infinity += other.infinity;
        self.running_sum += other.running_sum;
        Ok(())
    }

    /// Returns the bin counts.
    pub fn bins(&self) -> &[u64] {
        &self.bins
    }

    /// Returns the number of bins.
    pub fn num_bins(&self) -> usize {
        self.bins.len()
    }

    /// Returns the bin width in entries.
    pub fn bin_width(&self) -> u64 {
        self.bin_width
    }

    /// Returns the finite-but-out-of-range count.
    pub fn overflow(&self) -> u64 {
        self.overflow
    }

    /// Returns the infinite-distance count.
    pub fn infinity(&self) -> u64 {
        self.infinity
    }

    /// Returns the total mass recorded.
    pub fn running_sum(&self) -> u64 {
        self.running_sum
    }

    #[cfg(any(test, debug_assertions))]
    /// Validates the mass-conservation invariant.
    pub fn debug_validate_invariants(&self) {
        let mass: u64 = self.bins.iter().sum::<u64>() + self.overflow + self.infinity;
        assert_eq!(mass, self.running_sum);
    }
}

// ---------------------------------------------------------------------------
// FractionalHistogram (f64 bins)
// ---------------------------------------------------------------------------

/// Fractionally-binned reuse-distance histogram.
///
/// Used when the exact reuse distance is only known to lie within a span
/// of `range` consecutive entry positions: the access is spread uniformly
/// across the span. The infinity counter stays integral (first accesses
/// are always exact); bins and overflow are `f64`.
///
/// # Example
///
/// ```
/// use mrckit::histogram::FractionalHistogram;
///
/// let mut hist = FractionalHistogram::try_new(8, 1).unwrap();
/// // The distance lies somewhere in [2, 6): quarter weight to each bin.
/// hist.insert_fractional_range(2, 4, 1).unwrap();
/// assert!((hist.bins()[3] - 0.25).abs() < 1e-12);
/// assert_eq!(hist.running_sum(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FractionalHistogram {
    bins: Vec<f64>,
    bin_width: u64,
    overflow: f64,
    infinity: u64,
    running_sum: u64,
}

impl FractionalHistogram {
    /// Creates a histogram with `num_bins` bins of `bin_width` entries each.
    pub fn try_new(num_bins: usize, bin_width: u64) -> Result<Self, ConfigError> {
        if num_bins == 0 {
            return Err(ConfigError::new("histogram needs at least one bin"));
        }
        if bin_width == 0 {
            return Err(ConfigError::new("histogram bin width must be > 0"));
        }
        Ok(Self {
            bins: vec![0.0; num_bins],
            bin_width,
            overflow: 0.0,
            infinity: 0,
            running_sum: 0,
        })
    }

    /// Spreads `scale` accesses uniformly over the entry positions
    /// `[start, start + range)`.
    ///
    /// Positions at or past the histogram's reach accrue to the overflow
    /// counter. `range` must be at least 1: a zero-width span means the
    /// caller's bucket accounting has diverged.
    pub fn insert_fractional_range(
        &mut self,
        start: u64,
        range: u64,
        scale: u64,
    ) -> Result<(), CorruptStateError> {
        if range == 0 {
            return Err(CorruptStateError::new(
                "fractional insert with empty span",
            ));
        }
        let delta = scale as f64 / range as f64;
        let reach = self.bins.len() as u64 * self.bin_width;
        let end = start.saturating_add(range);
        if start >= reach {
            self.overflow += scale as f64;
        } else if end <= reach {
            for cell in start..end {
                self.bins[(cell / self.bin_width) as usize] += delta;
            }
        } else {
            for cell in start..reach {
                self.bins[(cell / self.bin_width) as usize] += delta;
            }
            self.overflow += delta * (end - reach) as f64;
        }
        checked_acc(&mut self.running_sum, scale)
    }

    /// Records `scale` first accesses (infinite reuse distance).
    pub fn insert_infinite(&mut self, scale: u64) -> Result<(), CorruptStateError> {
        checked_acc(&mut self.infinity, scale)?;
        checked_acc(&mut self.running_sum, scale)
    }

    /// Returns the bin masses.
    pub fn bins(&self) -> &[f64] {
        &self.bins
    }

    /// Returns the number of bins.
    pub fn num_bins(&self) -> usize {
        self.bins.len()
    }

    /// Returns the bin width in entries.
    pub fn bin_width(&self) -> u64 {
        self.bin_width
    }

    /// Returns the finite-but-out-of-range mass.
    pub fn overflow(&self) -> f64 {
        self.overflow
    }

    /// Returns the infinite-distance count.
    pub fn infinity(&self) -> u64 {
        self.infinity
    }

    /// Returns the total mass recorded.
    pub fn running_sum(&self) -> u64 {
        self.running_sum
    }

    #[cfg(any(test, debug_assertions))]
    /// Validates the mass-conservation invariant up to float tolerance.
    pub fn debug_validate_invariants(&self) {
        let mass: f64 = self.bins.iter().sum::<f64>() + self.overflow + self.infinity as f64;
        let expected = self.running_sum as f64;
        assert!(
            (mass - expected).abs() < 1e-6 * expected.max(1.0),
            "fractional mass {} != running sum {}",
            mass,
            expected
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Histogram --------------------------------------------------------

    #[test]
    fn histogram_rejects_degenerate_geometry() {
        assert!(Histogram::try_new(0, 1).is_err());
        assert!(Histogram::try_new(8, 0).is_err());
    }

    #[test]
    fn histogram_bins_by_width() {
        let mut hist = Histogram::try_new(4, 10).unwrap();
        hist.insert_finite(0).unwrap();
        hist.insert_finite(9).unwrap();
        hist.insert_finite(10).unwrap();
        hist.insert_finite(39).unwrap();
        hist.insert_finite(40).unwrap();
        assert_eq!(hist.bins(), &[2, 1, 0, 1]);
        assert_eq!(hist.overflow(), 1);
        hist.debug_validate_invariants();
    }

    #[test]
    fn histogram_scaled_insert_is_horizontal_and_vertical() {
        let mut hist = Histogram::try_new(100, 1).unwrap();
        // distance 3 at scale 10 stands for true distance 30, weight 10
        hist.insert_scaled_finite(3, 10).unwrap();
        assert_eq!(hist.bins()[30], 10);
        assert_eq!(hist.running_sum(), 10);
        hist.debug_validate_invariants();
    }

    #[test]
    fn histogram_scaled_insert_saturates_into_overflow() {
        let mut hist = Histogram::try_new(10, 1).unwrap();
        hist.insert_scaled_finite(u64::MAX / 2, 4).unwrap();
        assert_eq!(hist.overflow(), 4);
        assert_eq!(hist.running_sum(), 4);
    }

    #[test]
    fn histogram_infinite_tracks_separately() {
        let mut hist = Histogram::try_new(4, 1).unwrap();
        hist.insert_infinite().unwrap();
        hist.insert_scaled_infinite(5).unwrap();
        assert_eq!(hist.infinity(), 6);
        assert_eq!(hist.running_sum(), 6);
        assert_eq!(hist.bins().iter().sum::<u64>(), 0);
    }

    #[test]
    fn histogram_counter_overflow_is_corrupt_state() {
        let mut hist = Histogram::try_new(1, 1).unwrap();
        hist.insert_scaled_finite(0, u64::MAX).unwrap();
        assert!(hist.insert_finite(0).is_err());
    }

    #[test]
    fn histogram_adjust_first_bin_clamps_at_zero() {
        let mut hist = Histogram::try_new(4, 1).unwrap();
        hist.insert_finite(0).unwrap();
        hist.insert_finite(0).unwrap();
        hist.adjust_first_bin(3);
        assert_eq!(hist.bins()[0], 5);
        assert_eq!(hist.running_sum(), 5);

        hist.adjust_first_bin(-100);
        assert_eq!(hist.bins()[0], 0);
        assert_eq!(hist.running_sum(), 0);
    }

    #[test]
    fn histogram_merge_adds_binwise() {
        let mut a = Histogram::try_new(4, 1).unwrap();
        let mut b = Histogram::try_new(4, 1).unwrap();
        a.insert_finite(1).unwrap();
        a.insert_infinite().unwrap();
        b.insert_finite(1).unwrap();
        b.insert_finite(9).unwrap();
        a.merge(&b).unwrap();
        assert_eq!(a.bins(), &[0, 2, 0, 0]);
        assert_eq!(a.overflow(), 1);
        assert_eq!(a.infinity(), 1);
        assert_eq!(a.running_sum(), 4);
        a.debug_validate_invariants();
    }

    #[test]
    fn histogram_merge_rejects_geometry_mismatch() {
        let mut a = Histogram::try_new(4, 1).unwrap();
        let b = Histogram::try_new(4, 2).unwrap();
        let c = Histogram::try_new(8, 1).unwrap();
        assert!(a.merge(&b).is_err());
        assert!(a.merge(&c).is_err());
    }

    // -- FractionalHistogram ----------------------------------------------

    #[test]
    fn fractional_rejects_degenerate_geometry() {
        assert!(FractionalHistogram::try_new(0, 1).is_err());
        assert!(FractionalHistogram::try_new(8, 0).is_err());
    }

    #[test]
    fn fractional_spreads_mass_uniformly() {
        let mut hist = FractionalHistogram::try_new(8, 1).unwrap();
        hist.insert_fractional_range(2, 4, 1).unwrap();
        for bin in 2..6 {
            assert!((hist.bins()[bin] - 0.25).abs() < 1e-12);
        }
        assert_eq!(hist.running_sum(), 1);
        hist.debug_validate_invariants();
    }

    #[test]
    fn fractional_partial_range_spills_to_overflow() {
        let mut hist = FractionalHistogram::try_new(4, 1).unwrap();
        // Span [2, 7): cells 2 and 3 in range, 3 cells past the end.
        hist.insert_fractional_range(2, 5, 1).unwrap();
        assert!((hist.bins()[2] - 0.2).abs() < 1e-12);
        assert!((hist.bins()[3] - 0.2).abs() < 1e-12);
        assert!((hist.overflow() - 0.6).abs() < 1e-12);
        hist.debug_validate_invariants();
    }

    #[test]
    fn fractional_fully_out_of_range_goes_to_overflow() {
        let mut hist = FractionalHistogram::try_new(4, 1).unwrap();
        hist.insert_fractional_range(10, 3, 1).unwrap();
        assert!((hist.overflow() - 1.0).abs() < 1e-12);
        assert_eq!(hist.running_sum(), 1);
    }

    #[test]
    fn fractional_respects_bin_width() {
        let mut hist = FractionalHistogram::try_new(2, 4).unwrap();
        // Cells 0..8 are in range with width 4; span [3, 6) straddles bins.
        hist.insert_fractional_range(3, 3, 1).unwrap();
        assert!((hist.bins()[0] - 1.0 / 3.0).abs() < 1e-12);
        assert!((hist.bins()[1] - 2.0 / 3.0).abs() < 1e-12);
        hist.debug_validate_invariants();
    }

    #[test]
    fn fractional_empty_span_is_corrupt_state() {
        let mut hist = FractionalHistogram::try_new(4, 1).unwrap();
        assert!(hist.insert_fractional_range(0, 0, 1).is_err());
    }

    #[test]
    fn fractional_infinite_is_integral() {
        let mut hist = FractionalHistogram::try_new(4, 1).unwrap();
        hist.insert_infinite(1).unwrap();
        hist.insert_infinite(2).unwrap();
        assert_eq!(hist.infinity(), 3);
        assert_eq!(hist.running_sum(), 3);
        hist.debug_validate_invariants();
    }
}
