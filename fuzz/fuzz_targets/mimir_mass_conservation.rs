//! Checks Mimir's bucket mass conservation and histogram accounting
//! under arbitrary traces and both aging policies.

#![no_main]

use libfuzzer_sys::fuzz_target;
use mrckit::estimator::{Mimir, MimirAgingPolicy};

fuzz_target!(|data: &[u8]| {
    let Some((&selector, keys)) = data.split_first() else {
        return;
    };
    let aging = if selector % 2 == 0 {
        MimirAgingPolicy::Rounder
    } else {
        MimirAgingPolicy::Stacker
    };
    let num_buckets = 1 + (selector / 2) as usize % 8;

    let mut mimir = Mimir::try_new(num_buckets, aging, 64, 1).unwrap();
    for (i, &key) in keys.iter().enumerate() {
        mimir.access(key as u64).unwrap();
        assert_eq!(mimir.histogram().running_sum(), i as u64 + 1);
        mimir.debug_validate_invariants();
    }
});
