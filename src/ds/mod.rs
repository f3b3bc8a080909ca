pub mod bounded_heap;
pub mod evicting_table;
pub mod mimir_buckets;
pub mod splay_tree;

pub use bounded_heap::BoundedMaxHeap;
pub use evicting_table::{EvictingTable, TryPutOutcome};
pub use mimir_buckets::MimirBuckets;
pub use splay_tree::SplayTree;
