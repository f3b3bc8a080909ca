//! Core traits shared by all estimators.
//!
//! Every estimator, exact or sampled, consumes a stream of 64-bit keys
//! and can produce a miss-ratio curve at any point. The trait captures
//! that uniform surface so drivers can hold a `dyn ReuseDistanceEstimator`
//! (or the [`Estimator`](crate::builder::Estimator) wrapper) without
//! caring which algorithm is behind it.
//!
//! Access-time operations are total apart from fatal internal-invariant
//! violations: an access that sampling drops is *not* an error, it simply
//! leaves no trace in the histogram.

use crate::error::CorruptStateError;
use crate::mrc::MissRatioCurve;

/// A single-writer reuse-distance estimator.
///
/// # Example
///
/// ```
/// use mrckit::estimator::Olken;
/// use mrckit::traits::ReuseDistanceEstimator;
///
/// fn drive(est: &mut dyn ReuseDistanceEstimator, trace: &[u64]) {
///     for &key in trace {
///         est.access(key).expect("estimator state corrupt");
///     }
/// }
///
/// let mut olken = Olken::try_new(8, 1).unwrap();
/// drive(&mut olken, &[1, 2, 1, 3]);
/// assert_eq!(olken.num_accesses(), 4);
/// ```
pub trait ReuseDistanceEstimator {
    /// Feeds one access into the estimator.
    fn access(&mut self, key: u64) -> Result<(), CorruptStateError>;

    /// Converts the accumulated histogram into a miss-ratio curve.
    fn miss_ratio_curve(&self) -> Result<MissRatioCurve, CorruptStateError>;

    /// Returns the number of accesses consumed, including sampled-out ones.
    fn num_accesses(&self) -> u64;

    /// Returns the number of keys currently tracked.
    fn tracked_len(&self) -> usize;
}
