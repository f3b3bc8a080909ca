//! mrckit: miss-ratio-curve estimation from access traces.
//!
//! Exact (Olken) and sampled (SHARDS, Mimir, Evicting-Map) reuse-distance
//! estimators sharing one histogram → miss-ratio-curve pipeline. See
//! `DESIGN.md` for internal architecture and invariants.

pub mod builder;
pub mod ds;
pub mod error;
pub mod estimator;
pub mod hash;
pub mod histogram;
pub mod metrics;
pub mod mrc;
pub mod prelude;
pub mod traits;

pub use crate::builder::{Estimator, EstimatorBuilder, EstimatorPolicy, HistogramSpec};
pub use crate::ds::{BoundedMaxHeap, EvictingTable, MimirBuckets, SplayTree, TryPutOutcome};
pub use crate::estimator::{
    EvictingMap, FixedRateShards, FixedSizeShards, Mimir, MimirAgingPolicy, Olken,
};
pub use crate::histogram::{FractionalHistogram, Histogram};
pub use crate::mrc::MissRatioCurve;
