//! Checks the evicting table's slot contract under arbitrary key
//! streams: an occupied slot always holds the minimum hash among the
//! admitted keys that mapped to it.

#![no_main]

use libfuzzer_sys::fuzz_target;
use mrckit::ds::EvictingTable;
use mrckit::hash::splitmix64;

const CAPACITY: usize = 16;

fuzz_target!(|data: &[u8]| {
    let mut table = EvictingTable::try_new(CAPACITY, 1.0).unwrap();
    let mut min_per_slot = vec![u64::MAX; CAPACITY];

    for chunk in data.chunks_exact(2) {
        let key = u16::from_le_bytes([chunk[0], chunk[1]]) as u64;
        let hash = splitmix64(key);
        if hash <= table.threshold() {
            let slot = (hash % CAPACITY as u64) as usize;
            min_per_slot[slot] = min_per_slot[slot].min(hash);
        }
        table.try_put(key, 0);
    }

    for (stored, &expected) in table.debug_snapshot_hashes().iter().zip(&min_per_slot) {
        match stored {
            Some(hash) => assert_eq!(*hash, expected),
            None => assert_eq!(expected, u64::MAX),
        }
    }
});
