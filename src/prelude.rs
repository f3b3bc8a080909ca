//! Convenience re-exports for estimator drivers.

pub use crate::builder::{
    Estimator, EstimatorBuilder, EstimatorHistogram, EstimatorMetrics, EstimatorPolicy,
    HistogramSpec,
};
pub use crate::error::{ConfigError, CorruptStateError};
pub use crate::estimator::{
    EvictingMap, FixedRateShards, FixedSizeShards, Mimir, MimirAgingPolicy, Olken,
};
pub use crate::histogram::{FractionalHistogram, Histogram};
pub use crate::mrc::MissRatioCurve;
pub use crate::traits::ReuseDistanceEstimator;
