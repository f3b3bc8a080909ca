//! Error types for the mrckit library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when estimator configuration parameters are
//!   invalid (e.g. zero bin count, sampling ratio outside `(0, 1]`).
//! - [`CorruptStateError`]: Returned when internal data-structure invariants
//!   are violated mid-run (e.g. an order-statistic remove that fails on a
//!   timestamp the key map claims is present, or a histogram counter
//!   overflow). These are bugs, not recoverable conditions; callers should
//!   abort the run with the diagnostic.
//!
//! ## Example Usage
//!
//! ```
//! use mrckit::builder::{EstimatorBuilder, EstimatorPolicy, HistogramSpec};
//! use mrckit::error::ConfigError;
//!
//! // Fallible construction for user-configurable parameters
//! let ok = EstimatorBuilder::new(HistogramSpec::new(1 << 10, 1))
//!     .try_build(EstimatorPolicy::Olken);
//! assert!(ok.is_ok());
//!
//! // Invalid sampling ratio is caught without panicking
//! let bad = EstimatorBuilder::new(HistogramSpec::new(1 << 10, 1))
//!     .try_build(EstimatorPolicy::FixedRateShards { sampling_ratio: 2.0 });
//! let err: ConfigError = bad.err().expect("ratio 2.0 must be rejected");
//! assert!(err.message().contains("sampling ratio"));
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when estimator configuration parameters are invalid.
///
/// Produced by fallible constructors such as
/// [`Histogram::try_new`](crate::histogram::Histogram::try_new) and the
/// builder's [`try_build`](crate::builder::EstimatorBuilder::try_build).
/// Carries a human-readable description of which parameter failed
/// validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// CorruptStateError
// ---------------------------------------------------------------------------

/// Error returned when an estimator's internal invariants are violated.
///
/// Reuse-distance estimators keep a key map and an order-statistic tree in
/// lockstep; a remove that fails on a timestamp the map vouches for means
/// the pair has diverged. Likewise, a histogram counter that would exceed
/// its numeric range indicates corrupted accounting. Both are fatal: the
/// accumulated histogram can no longer be trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorruptStateError(String);

impl CorruptStateError {
    /// Creates a new `CorruptStateError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorruptStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for CorruptStateError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- ConfigError ------------------------------------------------------

    #[test]
    fn config_display_shows_message() {
        let err = ConfigError::new("bin width must be > 0");
        assert_eq!(err.to_string(), "bin width must be > 0");
    }

    #[test]
    fn config_debug_includes_message() {
        let err = ConfigError::new("bad ratio");
        let dbg = format!("{:?}", err);
        assert!(dbg.contains("bad ratio"));
    }

    #[test]
    fn config_message_accessor() {
        let err = ConfigError::new("test");
        assert_eq!(err.message(), "test");
    }

    #[test]
    fn config_clone_and_eq() {
        let a = ConfigError::new("x");
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn config_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<ConfigError>();
    }

    // -- CorruptStateError ------------------------------------------------

    #[test]
    fn corrupt_state_display_shows_message() {
        let err = CorruptStateError::new("tree/map mismatch");
        assert_eq!(err.to_string(), "tree/map mismatch");
    }

    #[test]
    fn corrupt_state_message_accessor() {
        let err = CorruptStateError::new("test");
        assert_eq!(err.message(), "test");
    }

    #[test]
    fn corrupt_state_clone_and_eq() {
        let a = CorruptStateError::new("x");
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn corrupt_state_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<CorruptStateError>();
    }
}
