//! The reuse-distance estimator family.
//!
//! Five estimators share one data-flow skeleton (consume an access
//! stream, accumulate a reuse-distance histogram) and trade exactness
//! for memory and speed in different ways:
//!
//! | Estimator          | Sampling                  | Memory bound        |
//! |--------------------|---------------------------|---------------------|
//! | [`Olken`]          | none (exact)              | distinct keys       |
//! | [`FixedRateShards`]| constant hash threshold   | admitted keys       |
//! | [`FixedSizeShards`]| adaptive hash threshold   | `max_tracked`       |
//! | [`Mimir`]          | none (bucketed recency)   | bucket count        |
//! | [`EvictingMap`]    | per-slot min-hash         | slot count          |

pub mod evicting_map;
pub mod fixed_rate_shards;
pub mod fixed_size_shards;
pub mod mimir;
pub mod olken;

pub use evicting_map::EvictingMap;
pub use fixed_rate_shards::FixedRateShards;
pub use fixed_size_shards::FixedSizeShards;
pub use mimir::{Mimir, MimirAgingPolicy};
pub use olken::Olken;
