//! Open-address table that keeps the smallest-hash key per slot.
//!
//! The table is the sampling heart of the evicting-map estimator. Each key
//! hashes to exactly one slot (`hash % capacity`); a slot always retains
//! the smallest-hash element ever offered to it, so colliding arrivals
//! with larger hashes are dropped. Collisions therefore act as spatial
//! sampling with a per-slot, ever-tightening admission bar.
//!
//! ## Slot rules
//!
//! ```text
//!   try_put(key, value)             slot = hash(key) % m
//!   ┌───────────────────────────┬──────────────────────┬──────────────┐
//!   │ incoming vs slot          │ action               │ outcome      │
//!   ├───────────────────────────┼──────────────────────┼──────────────┤
//!   │ slot empty (sentinel)     │ fill slot            │ Inserted     │
//!   │ incoming hash < slot hash │ displace incumbent   │ Replaced{..} │
//!   │ same key                  │ update value         │ Updated{..}  │
//!   │ otherwise                 │ nothing              │ Ignored      │
//!   └───────────────────────────┴──────────────────────┴──────────────┘
//! ```
//!
//! An empty slot is marked by the sentinel hash `u64::MAX`, which is why
//! that hash value can never be admitted.
//!
//! ## Integrated cardinality sketch
//!
//! Because each slot retains its minimum hash, the slot array doubles as a
//! HyperLogLog: the leading-zero count of a slot's hash is the register.
//! The sketch maintains `running_denominator = Σ 2^-(lz(slot hash)+1)`
//! incrementally (never-filled slots contribute the initial sampling
//! ratio as a placeholder), applies the standard alpha correction, and
//! falls back to linear counting while the estimate is small and empty
//! slots remain. The ratio of estimated cardinality to filled slots gives
//! the scale factor the estimator multiplies histogram writes by.
//!
//! ## Threshold shortcut
//!
//! Any incoming hash strictly above the largest slot hash can be rejected
//! without probing. The threshold starts at the configured sampling
//! ratio's value and is refreshed from the slot array once the table
//! fills, and again whenever the slot holding the maximum is displaced.

use crate::error::ConfigError;
use crate::hash::{sampling_threshold, Hasher64, SplitMix64};

const EMPTY_HASH: u64 = u64::MAX;

#[derive(Debug, Clone, Copy)]
struct Slot {
    key: u64,
    hash: u64,
    value: u64,
}

/// Outcome of a [`EvictingTable::try_put`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryPutOutcome {
    /// The slot was empty; the element now occupies it.
    Inserted,
    /// The same key was present; only its value changed.
    Updated {
        old_value: u64,
    },
    /// A smaller hash displaced the incumbent element.
    Replaced {
        old_key: u64,
        old_hash: u64,
        old_value: u64,
    },
    /// The element lost to the incumbent (or the threshold) and was dropped.
    Ignored,
}

/// Fixed-capacity min-hash-keeping table with a built-in cardinality
/// sketch.
///
/// # Example
///
/// ```
/// use mrckit::ds::{EvictingTable, TryPutOutcome};
///
/// let mut table = EvictingTable::try_new(64, 1.0).unwrap();
/// assert_eq!(table.try_put(1, 100), TryPutOutcome::Inserted);
/// assert_eq!(
///     table.try_put(1, 200),
///     TryPutOutcome::Updated { old_value: 100 }
/// );
/// ```
#[derive(Debug)]
pub struct EvictingTable<H: Hasher64 = SplitMix64> {
    slots: Vec<Slot>,
    hasher: H,
    init_sampling_ratio: f64,
    global_threshold: u64,
    num_inserted: usize,
    running_denominator: f64,
    alpha_m: f64,
}

impl EvictingTable<SplitMix64> {
    /// Creates a table of `capacity` slots admitting roughly
    /// `init_sampling_ratio` of the key space, hashed with splitmix64.
    pub fn try_new(capacity: usize, init_sampling_ratio: f64) -> Result<Self, ConfigError> {
        Self::try_with_hasher(capacity, init_sampling_ratio, SplitMix64)
    }
}

impl<H: Hasher64> EvictingTable<H> {
    /// Creates a table with an explicit hasher.
    pub fn try_with_hasher(
        capacity: usize,
        init_sampling_ratio: f64,
        hasher: H,
    ) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("evicting table needs at least one slot"));
        }
        if !(init_sampling_ratio > 0.0 && init_sampling_ratio <= 1.0) {
            return Err(ConfigError::new(format!(
                "sampling ratio must be in (0, 1], got {}",
                init_sampling_ratio,
            )));
        }
        Ok(Self {
            slots: vec![
                Slot {
                    key: 0,
                    hash: EMPTY_HASH,
                    value: 0,
                };
                capacity
            ],
            hasher,
            init_sampling_ratio,
            global_threshold: sampling_threshold(init_sampling_ratio),
            num_inserted: 0,
            // Sum of reciprocals: never-filled slots stand in with the
            // initial sampling ratio.
            running_denominator: capacity as f64 * init_sampling_ratio,
            alpha_m: hll_alpha_m(capacity),
        })
    }

    /// Offers `(key, value)` to the table; see the module docs for the
    /// slot rules.
    pub fn try_put(&mut self, key: u64, value: u64) -> TryPutOutcome {
        let hash = self.hasher.hash(key);
        if hash > self.global_threshold {
            return TryPutOutcome::Ignored;
        }
        let idx = (hash % self.slots.len() as u64) as usize;
        let incumbent = self.slots[idx];

        if incumbent.hash == EMPTY_HASH {
            self.slots[idx] = Slot { key, hash, value };
            self.num_inserted += 1;
            self.running_denominator += register_weight(hash) - self.init_sampling_ratio;
            if self.num_inserted == self.slots.len() {
                self.refresh_threshold();
            }
            return TryPutOutcome::Inserted;
        }
        if hash < incumbent.hash {
            self.slots[idx] = Slot { key, hash, value };
            self.running_denominator += register_weight(hash) - register_weight(incumbent.hash);
            if incumbent.hash == self.global_threshold && self.is_full() {
                self.refresh_threshold();
            }
            return TryPutOutcome::Replaced {
                old_key: incumbent.key,
                old_hash: incumbent.hash,
                old_value: incumbent.value,
            };
        }
        if key == incumbent.key {
            self.slots[idx].value = value;
            return TryPutOutcome::Updated {
                old_value: incumbent.value,
            };
        }
        TryPutOutcome::Ignored
    }

    /// Returns the number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of slots that have ever been filled.
    pub fn num_inserted(&self) -> usize {
        self.num_inserted
    }

    /// Returns `true` once every slot holds an element.
    pub fn is_full(&self) -> bool {
        self.num_inserted == self.slots.len()
    }

    /// Returns the current admission threshold.
    pub fn threshold(&self) -> u64 {
        self.global_threshold
    }

    /// Estimates the number of distinct keys offered so far.
    ///
    /// HyperLogLog with the standard alpha correction; switches to linear
    /// counting while the raw estimate is small and empty slots remain.
    pub fn cardinality(&self) -> f64 {
        let m = self.slots.len() as f64;
        let raw = self.alpha_m * m * m / self.running_denominator;
        let empty_slots = (self.slots.len() - self.num_inserted) as f64;
        if raw * self.init_sampling_ratio < 2.5 * m && empty_slots > 0.0 {
            m * (m / empty_slots).ln() / self.init_sampling_ratio
        } else {
            raw
        }
    }

    /// Returns the multiplier for histogram writes: estimated cardinality
    /// over filled slots, clamped to at least 1.
    pub fn scale_factor(&self) -> u64 {
        if self.num_inserted == 0 {
            return 1;
        }
        let scale = self.cardinality() / self.num_inserted as f64;
        (scale.floor() as u64).max(1)
    }

    fn refresh_threshold(&mut self) {
        let mut max_hash = 0;
        for slot in &self.slots {
            if slot.hash > max_hash {
                max_hash = slot.hash;
            }
        }
        self.global_threshold = max_hash;
    }

    #[cfg(any(test, debug_assertions))]
    /// Returns the stored hash per slot (`None` for empty slots).
    pub fn debug_snapshot_hashes(&self) -> Vec<Option<u64>> {
        self.slots
            .iter()
            .map(|slot| (slot.hash != EMPTY_HASH).then_some(slot.hash))
            .collect()
    }
}

/// Alpha correction for an `m`-register HyperLogLog.
fn hll_alpha_m(m: usize) -> f64 {
    match m {
        16 => 0.673,
        32 => 0.697,
        64 => 0.709,
        m if m >= 128 => 0.7213 / (1.0 + 1.079 / m as f64),
        _ => 1.0,
    }
}

/// A slot's contribution to the denominator: `2^-(lz(hash)+1)`, the
/// standard register weight with the first-one-bit position as register.
#[inline]
fn register_weight(hash: u64) -> f64 {
    (-(hash.leading_zeros() as f64) - 1.0).exp2()
}
