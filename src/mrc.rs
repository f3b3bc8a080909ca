//! Miss-ratio curves: histogram conversion, comparison, serialization.
//!
//! A miss-ratio curve maps cache size to the fraction of accesses that
//! would miss under LRU. For a reuse-distance histogram the conversion is
//! a single cumulative pass: the miss ratio at size `s` is the tail mass
//! of the distribution at `s`. The output vector has `num_bins + 2`
//! entries: one per bin, one after subtracting the in-range mass (where
//! only overflow and infinite distances remain), and one after also
//! subtracting the overflow, which leaves exactly the infinite share.
//! Indices are in units of entries; multiply by the bin width for cache
//! sizes.
//!
//! Two byte forms are supported for downstream tooling:
//!
//! - **Dense**: every miss ratio as a little-endian `f64`.
//! - **Sparse**: `(u64 index, f64 miss_ratio)` records, one for index 0
//!   (always `1.0` for a non-degenerate curve) and one per index where the
//!   ratio changes; the reader carries values forward.

use crate::error::{ConfigError, CorruptStateError};
use crate::histogram::{FractionalHistogram, Histogram};

/// A monotone non-increasing miss-ratio vector with its bin width.
///
/// # Example
///
/// ```
/// use mrckit::histogram::Histogram;
/// use mrckit::mrc::MissRatioCurve;
///
/// let mut hist = Histogram::try_new(3, 1).unwrap();
/// for _ in 0..4 {
///     hist.insert_finite(0).unwrap();
/// }
/// hist.insert_infinite().unwrap();
///
/// let mrc = MissRatioCurve::from_histogram(&hist).unwrap();
/// assert_eq!(mrc.values()[0], 1.0);
/// assert!((mrc.values()[1] - 0.2).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MissRatioCurve {
    miss_ratio: Vec<f64>,
    bin_width: u64,
}

impl MissRatioCurve {
    /// Converts an integer histogram into a miss-ratio curve.
    ///
    /// Fails with [`CorruptStateError`] if the histogram's mass accounting
    /// is inconsistent (a bin exceeding the remaining tail, or leftovers
    /// that do not equal the infinity counter). An all-empty histogram
    /// yields `[1.0, 0.0, …]` with no division by zero.
    pub fn from_histogram(histogram: &Histogram) -> Result<Self, CorruptStateError> {
        let num_bins = histogram.num_bins();
        let total = histogram.running_sum();
        let mut miss_ratio = vec![0.0; num_bins + 2];
        miss_ratio[0] = 1.0;
        if total == 0 {
            return Ok(Self {
                miss_ratio,
                bin_width: histogram.bin_width(),
            });
        }

        let mut tail = total;
        for (i, &count) in histogram.bins().iter().enumerate() {
            miss_ratio[i] = tail as f64 / total as f64;
            tail = tail.checked_sub(count).ok_or_else(|| {
                CorruptStateError::new("histogram bin exceeds remaining tail mass")
            })?;
        }
        miss_ratio[num_bins] = tail as f64 / total as f64;
        tail = tail.checked_sub(histogram.overflow()).ok_or_else(|| {
            CorruptStateError::new("histogram overflow exceeds remaining tail mass")
        })?;
        miss_ratio[num_bins + 1] = tail as f64 / total as f64;
        if tail != histogram.infinity() {
            return Err(CorruptStateError::new(
                "histogram tail does not match infinity counter",
            ));
        }
        Ok(Self {
            miss_ratio,
            bin_width: histogram.bin_width(),
        })
    }

    /// Converts a fractional histogram into a miss-ratio curve.
    pub fn from_fractional_histogram(
        histogram: &FractionalHistogram,
    ) -> Result<Self, CorruptStateError> {
        let num_bins = histogram.num_bins();
        let total = histogram.running_sum();
        let mut miss_ratio = vec![0.0; num_bins + 2];
        miss_ratio[0] = 1.0;
        if total == 0 {
            return Ok(Self {
                miss_ratio,
                bin_width: histogram.bin_width(),
            });
        }

        let total = total as f64;
        let mut tail = total;
        for (i, &mass) in histogram.bins().iter().enumerate() {
            miss_ratio[i] = tail / total;
            if tail + 1e-9 < mass {
                return Err(CorruptStateError::new(
                    "fractional bin exceeds remaining tail mass",
                ));
            }
            tail -= mass;
        }
        miss_ratio[num_bins] = tail / total;
        tail -= histogram.overflow();
        miss_ratio[num_bins + 1] = tail / total;
        Ok(Self {
            miss_ratio,
            bin_width: histogram.bin_width(),
        })
    }

    /// Returns the miss-ratio values (length `num_bins + 2`).
    pub fn values(&self) -> &[f64] {
        &self.miss_ratio
    }

    /// Returns the number of values.
    pub fn len(&self) -> usize {
        self.miss_ratio.len()
    }

    /// Returns `true` if the curve holds no values.
    pub fn is_empty(&self) -> bool {
        self.miss_ratio.is_empty()
    }

    /// Returns the bin width the curve indices are scaled by.
    pub fn bin_width(&self) -> u64 {
        self.bin_width
    }

    // -- serialization ----------------------------------------------------

    /// Serializes every value as a little-endian `f64`.
    pub fn to_dense_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.miss_ratio.len() * 8);
        for value in &self.miss_ratio {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes
    }

    /// Reconstructs a curve from the dense byte form.
    pub fn from_dense_bytes(bytes: &[u8], bin_width: u64) -> Result<Self, ConfigError> {
        if bytes.len() % 8 != 0 {
            return Err(ConfigError::new("dense curve length not a multiple of 8"));
        }
        let miss_ratio = bytes
            .chunks_exact(8)
            .map(|chunk| f64::from_le_bytes(chunk.try_into().expect("chunk of 8")))
            .collect();
        Ok(Self {
            miss_ratio,
            bin_width,
        })
    }

    /// Serializes the curve as change-point records.
    ///
    /// The initial `(0, 1.0)` record is always emitted; thereafter a record
    /// appears only at indices where the ratio changes.
    pub fn to_sparse_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        let mut previous = None;
        for (i, &value) in self.miss_ratio.iter().enumerate() {
            if previous != Some(value) {
                bytes.extend_from_slice(&(i as u64).to_le_bytes());
                bytes.extend_from_slice(&value.to_le_bytes());
                previous = Some(value);
            }
        }
        bytes
    }

    /// Reconstructs a dense curve of `num_values` entries from the sparse
    /// byte form, carrying each recorded ratio forward to the next record.
    ///
    /// The writer contract requires a leading `(0, 1.0)` record; its
    /// absence means the input is not a curve this library wrote.
    pub fn from_sparse_bytes(
        bytes: &[u8],
        num_values: usize,
        bin_width: u64,
    ) -> Result<Self, ConfigError> {
        if bytes.len() % 16 != 0 {
            return Err(ConfigError::new("sparse curve length not a multiple of 16"));
        }
        let mut records = bytes.chunks_exact(16).map(|chunk| {
            let index = u64::from_le_bytes(chunk[..8].try_into().expect("8 bytes"));
            let value = f64::from_le_bytes(chunk[8..].try_into().expect("8 bytes"));
            (index, value)
        });

        let first = records
            .next()
            .ok_or_else(|| ConfigError::new("sparse curve has no records"))?;
        if first != (0, 1.0) {
            return Err(ConfigError::new("sparse curve must lead with (0, 1.0)"));
        }

        let mut miss_ratio = vec![0.0; num_values];
        let mut from = 0usize;
        let mut value = first.1;
        for (index, next_value) in records {
            let index = index as usize;
            if index <= from || index >= num_values {
                return Err(ConfigError::new("sparse curve records out of order"));
            }
            for slot in &mut miss_ratio[from..index] {
                *slot = value;
            }
            from = index;
            value = next_value;
        }
        for slot in &mut miss_ratio[from..] {
            *slot = value;
        }
        Ok(Self {
            miss_ratio,
            bin_width,
        })
    }

    // -- comparison -------------------------------------------------------

    /// Mean absolute error against `other`.
    ///
    /// Matching indices are compared directly; if lengths differ, the
    /// shorter curve is padded with its final value. Fails if the curves
    /// were built with different bin widths.
    pub fn mean_absolute_error(&self, other: &MissRatioCurve) -> Result<f64, ConfigError> {
        self.compare(other, |diff| diff.abs())
    }

    /// Mean squared error against `other`; same rules as
    /// [`mean_absolute_error`](Self::mean_absolute_error).
    pub fn mean_squared_error(&self, other: &MissRatioCurve) -> Result<f64, ConfigError> {
        self.compare(other, |diff| diff * diff)
    }

    fn compare(
        &self,
        other: &MissRatioCurve,
        penalty: impl Fn(f64) -> f64,
    ) -> Result<f64, ConfigError> {
        if self.bin_width != other.bin_width {
            return Err(ConfigError::new(format!(
                "cannot compare curves with bin widths {} and {}",
                self.bin_width, other.bin_width,
            )));
        }
        let lhs = &self.miss_ratio;
        let rhs = &other.miss_ratio;
        let min_bound = lhs.len().min(rhs.len());
        let max_bound = lhs.len().max(rhs.len());

        let mut sum = 0.0;
        for i in 0..min_bound {
            sum += penalty(lhs[i] - rhs[i]);
        }
        for i in min_bound..max_bound {
            let diff = if lhs.len() > rhs.len() {
                lhs[i] - rhs[min_bound - 1]
            } else {
                rhs[i] - lhs[min_bound - 1]
            };
            sum += penalty(diff);
        }
        Ok(sum / max_bound.max(1) as f64)
    }

    #[cfg(any(test, debug_assertions))]
    /// Validates that the curve is monotone non-increasing.
    pub fn debug_validate_invariants(&self) {
        for window in self.miss_ratio.windows(2) {
            assert!(
                window[0] >= window[1] - 1e-9,
                "miss-ratio curve not monotone: {} < {}",
                window[0],
                window[1]
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn histogram_from(bins: &[u64], infinity: u64) -> Histogram {
        let mut hist = Histogram::try_new(bins.len(), 1).unwrap();
        for (i, &count) in bins.iter().enumerate() {
            for _ in 0..count {
                hist.insert_finite(i as u64).unwrap();
            }
        }
        for _ in 0..infinity {
            hist.insert_infinite().unwrap();
        }
        hist
    }

    #[test]
    fn mrc_conversion_matches_hand_computation() {
        let hist = histogram_from(&[10, 10, 0, 0, 5], 0);
        let mrc = MissRatioCurve::from_histogram(&hist).unwrap();
        let expected = [1.0, 0.6, 0.2, 0.2, 0.2, 0.0, 0.0];
        assert_eq!(mrc.len(), expected.len());
        for (got, want) in mrc.values().iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-12);
        }
        mrc.debug_validate_invariants();
    }

    #[test]
    fn mrc_leads_with_one_and_ends_with_infinity_share() {
        let hist = histogram_from(&[4, 0, 0], 1);
        let mrc = MissRatioCurve::from_histogram(&hist).unwrap();
        assert_eq!(mrc.values()[0], 1.0);
        let last = *mrc.values().last().unwrap();
        assert!((last - 0.2).abs() < 1e-12); // infinity / total
        mrc.debug_validate_invariants();
    }

    #[test]
    fn mrc_empty_histogram_avoids_division_by_zero() {
        let hist = Histogram::try_new(4, 1).unwrap();
        let mrc = MissRatioCurve::from_histogram(&hist).unwrap();
        assert_eq!(mrc.len(), 6);
        assert_eq!(mrc.values()[0], 1.0);
        assert!(mrc.values()[1..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn mrc_fractional_conversion_matches_integer() {
        let mut frac = FractionalHistogram::try_new(5, 1).unwrap();
        let mut hist = Histogram::try_new(5, 1).unwrap();
        for distance in [0u64, 1, 1, 3] {
            frac.insert_fractional_range(distance, 1, 1).unwrap();
            hist.insert_finite(distance).unwrap();
        }
        frac.insert_infinite(1).unwrap();
        hist.insert_infinite().unwrap();

        let a = MissRatioCurve::from_fractional_histogram(&frac).unwrap();
        let b = MissRatioCurve::from_histogram(&hist).unwrap();
        for (x, y) in a.values().iter().zip(b.values().iter()) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn mrc_dense_round_trip_is_identity() {
        let hist = histogram_from(&[3, 1, 4, 1, 5], 9);
        let mrc = MissRatioCurve::from_histogram(&hist).unwrap();
        let bytes = mrc.to_dense_bytes();
        let back = MissRatioCurve::from_dense_bytes(&bytes, mrc.bin_width()).unwrap();
        assert_eq!(mrc, back);
    }

    #[test]
    fn mrc_dense_rejects_ragged_input() {
        assert!(MissRatioCurve::from_dense_bytes(&[0u8; 7], 1).is_err());
    }

    #[test]
    fn mrc_sparse_emits_change_points_only() {
        let hist = histogram_from(&[10, 10, 0, 0, 5], 0);
        let mrc = MissRatioCurve::from_histogram(&hist).unwrap();
        let bytes = mrc.to_sparse_bytes();
        // Change points: the leading (0, 1.0), then indices 1, 2, and 5.
        assert_eq!(bytes.len() / 16, 4);
        let first_index = u64::from_le_bytes(bytes[..8].try_into().unwrap());
        let first_value = f64::from_le_bytes(bytes[8..16].try_into().unwrap());
        assert_eq!(first_index, 0);
        assert_eq!(first_value, 1.0);
    }

    #[test]
    fn mrc_sparse_round_trip_reconstructs_dense_curve() {
        let hist = histogram_from(&[10, 10, 0, 0, 5], 0);
        let mrc = MissRatioCurve::from_histogram(&hist).unwrap();
        let bytes = mrc.to_sparse_bytes();
        let back = MissRatioCurve::from_sparse_bytes(&bytes, mrc.len(), mrc.bin_width()).unwrap();
        assert_eq!(mrc, back);
    }

    #[test]
    fn mrc_sparse_requires_leading_record() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1u64.to_le_bytes());
        bytes.extend_from_slice(&0.5f64.to_le_bytes());
        assert!(MissRatioCurve::from_sparse_bytes(&bytes, 4, 1).is_err());
        assert!(MissRatioCurve::from_sparse_bytes(&[], 4, 1).is_err());
    }

    #[test]
    fn mrc_error_metrics_on_equal_curves_are_zero() {
        let hist = histogram_from(&[1, 2, 3], 4);
        let mrc = MissRatioCurve::from_histogram(&hist).unwrap();
        assert_eq!(mrc.mean_absolute_error(&mrc).unwrap(), 0.0);
        assert_eq!(mrc.mean_squared_error(&mrc).unwrap(), 0.0);
    }

    #[test]
    fn mrc_error_metrics_pad_shorter_curve() {
        let a = MissRatioCurve {
            miss_ratio: vec![1.0, 0.5],
            bin_width: 1,
        };
        let b = MissRatioCurve {
            miss_ratio: vec![1.0, 0.5, 0.5, 0.25],
            bin_width: 1,
        };
        // Padded comparison: only the final index differs, by 0.25.
        let mae = a.mean_absolute_error(&b).unwrap();
        assert!((mae - 0.25 / 4.0).abs() < 1e-12);
        let mse = a.mean_squared_error(&b).unwrap();
        assert!((mse - 0.0625 / 4.0).abs() < 1e-12);
    }

    #[test]
    fn mrc_error_metrics_reject_bin_width_mismatch() {
        let a = MissRatioCurve {
            miss_ratio: vec![1.0],
            bin_width: 1,
        };
        let b = MissRatioCurve {
            miss_ratio: vec![1.0],
            bin_width: 2,
        };
        assert!(a.mean_absolute_error(&b).is_err());
        assert!(a.mean_squared_error(&b).is_err());
    }
}
