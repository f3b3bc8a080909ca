//! Feed a small trace through the exact estimator and print the curve.
//!
//! Run with: `cargo run --example basic_olken`

use mrckit::estimator::Olken;
use mrckit::traits::ReuseDistanceEstimator;

fn main() {
    let trace: Vec<u64> = vec![1, 2, 3, 1, 2, 4, 1, 5, 2, 3, 3, 1];

    let mut olken = Olken::try_new(8, 1).expect("valid geometry");
    for &key in &trace {
        olken.access(key).expect("estimator state corrupt");
    }

    let hist = olken.histogram();
    println!("bins:     {:?}", hist.bins());
    println!("overflow: {}", hist.overflow());
    println!("infinity: {}", hist.infinity());

    let mrc = olken.miss_ratio_curve().expect("curve");
    for (size, ratio) in mrc.values().iter().enumerate() {
        println!("cache size {:>2} -> miss ratio {:.3}", size, ratio);
    }
}
