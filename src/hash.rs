//! Key hashing for threshold sampling and cardinality sketching.
//!
//! All sampled estimators share one requirement: a deterministic 64-bit
//! hash with good avalanche, uniform enough that "admit iff
//! `hash <= threshold`" samples keys spatially and that leading-zero
//! counts follow the geometric distribution HyperLogLog expects.
//!
//! The default hasher is splitmix64. Estimators take the hasher as a type
//! parameter so an alternative can be monomorphized in without
//! function-pointer dispatch.

/// A deterministic 64-bit key hasher.
///
/// Implementations must be pure: the same key always hashes to the same
/// value within one estimator's lifetime, since sampled estimators compare
/// hashes across accesses.
pub trait Hasher64 {
    fn hash(&self, key: u64) -> u64;
}

/// The splitmix64 finalizer, used as the default key hasher.
///
/// # Example
///
/// ```
/// use mrckit::hash::{Hasher64, SplitMix64};
///
/// let hasher = SplitMix64;
/// assert_eq!(hasher.hash(42), hasher.hash(42));
/// assert_ne!(hasher.hash(0), hasher.hash(1));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SplitMix64;

impl Hasher64 for SplitMix64 {
    #[inline]
    fn hash(&self, key: u64) -> u64 {
        splitmix64(key)
    }
}

/// Mixes a 64-bit key through the splitmix64 finalizer.
#[inline]
pub fn splitmix64(key: u64) -> u64 {
    let mut k = key;
    k = (k ^ (k >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    k = (k ^ (k >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    k ^ (k >> 31)
}

/// Converts a sampling ratio in `(0, 1]` to an inclusive hash threshold.
///
/// A key is admitted iff `hash(key) <= sampling_threshold(ratio)`. The
/// conversion saturates so that a ratio of exactly 1.0 admits every key
/// rather than overflowing to zero.
///
/// # Example
///
/// ```
/// use mrckit::hash::sampling_threshold;
///
/// assert_eq!(sampling_threshold(1.0), u64::MAX);
/// assert_eq!(sampling_threshold(0.5), (0.5 * u64::MAX as f64) as u64);
/// ```
#[inline]
pub fn sampling_threshold(ratio: f64) -> u64 {
    // Float-to-int casts saturate, which handles ratio = 1.0 rounding
    // u64::MAX up to 2^64.
    (ratio * u64::MAX as f64) as u64
}
