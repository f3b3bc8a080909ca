//! Differential fuzzing of the order-statistic splay tree against a
//! naive vector model.

#![no_main]

use libfuzzer_sys::fuzz_target;
use mrckit::ds::SplayTree;

fuzz_target!(|data: &[u8]| {
    let mut tree = SplayTree::new();
    let mut model: Vec<u64> = Vec::new();

    for chunk in data.chunks_exact(2) {
        let key = chunk[1] as u64;
        match chunk[0] % 3 {
            0 => {
                let inserted = tree.insert(key);
                assert_eq!(inserted, !model.contains(&key));
                if inserted {
                    model.push(key);
                }
            },
            1 => {
                let removed = tree.remove(key);
                assert_eq!(removed, model.contains(&key));
                if removed {
                    let pos = model.iter().position(|&k| k == key).unwrap();
                    model.swap_remove(pos);
                }
            },
            _ => {
                let expected = if model.contains(&key) {
                    Some(model.iter().filter(|&&k| k > key).count() as u64)
                } else {
                    None
                };
                assert_eq!(tree.reverse_rank(key), expected);
            },
        }
        assert_eq!(tree.len(), model.len());
    }
    tree.debug_validate_invariants();
});
