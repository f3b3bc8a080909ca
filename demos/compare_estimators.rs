//! Run every estimator over one synthetic trace and compare the curves
//! against the exact baseline.
//!
//! Run with: `cargo run --example compare_estimators`

use mrckit::builder::{EstimatorBuilder, EstimatorPolicy, HistogramSpec, MimirAgingPolicy};
use mrckit::estimator::Olken;
use mrckit::traits::ReuseDistanceEstimator;

fn main() {
    // Hotset-ish trace: a few hot keys, a long cold tail.
    let mut trace = Vec::new();
    let mut state = 0x9e3779b97f4a7c15u64;
    for i in 0..200_000u64 {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let key = if state % 10 < 7 { state % 64 } else { i };
        trace.push(key);
    }

    let spec = HistogramSpec::new(1 << 16, 1);
    let mut oracle = Olken::try_new(spec.num_bins, spec.bin_width).expect("valid geometry");
    for &key in &trace {
        oracle.access(key).expect("oracle corrupt");
    }
    let oracle_mrc = oracle.miss_ratio_curve().expect("curve");

    let policies = [
        ("fixed-rate shards", EstimatorPolicy::FixedRateShards { sampling_ratio: 0.01 }),
        (
            "fixed-size shards",
            EstimatorPolicy::FixedSizeShards {
                sampling_ratio: 1.0,
                max_tracked: 4096,
            },
        ),
        (
            "mimir (rounder)",
            EstimatorPolicy::Mimir {
                num_buckets: 256,
                aging: MimirAgingPolicy::Rounder,
            },
        ),
        (
            "evicting map",
            EstimatorPolicy::EvictingMap {
                sampling_ratio: 1.0,
                num_slots: 4096,
            },
        ),
    ];

    for (name, policy) in policies {
        let mut est = EstimatorBuilder::new(spec).try_build(policy).expect("config");
        for &key in &trace {
            est.access(key).expect("estimator corrupt");
        }
        let mrc = est.miss_ratio_curve().expect("curve");
        let mae = oracle_mrc.mean_absolute_error(&mrc).expect("same width");
        let mse = oracle_mrc.mean_squared_error(&mrc).expect("same width");
        println!("{:<18} mae {:.5}  mse {:.6}", name, mae, mse);
    }
}
