//! Capacity threshold and aggregate-size bookkeeping.
//!
//! One `capacity` number serves two disciplines that are deliberately kept
//! apart:
//!
//! - **size mode**: sized inserts charge their cost to `used`; after each
//!   insert or update the cache vacuums from the LRU end while
//!   [`over_budget`](CapacityAccountant::over_budget) holds.
//! - **count mode**: unsized inserts charge nothing; only
//!   [`resize`](crate::LruDict::resize) bounds the cache, by entry count
//!   ([`exceeds_count`](CapacityAccountant::exceeds_count)).
//!
//! `used` is the exact sum of live entry sizes. Every charge has a matching
//! refund, so it never drifts.

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityAccountant {
    capacity: usize,
    used: usize,
}

impl CapacityAccountant {
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::zero_capacity());
        }
        Ok(Self { capacity, used: 0 })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Aggregate size of all live entries.
    pub fn used(&self) -> usize {
        self.used
    }

    /// An entry whose own size exceeds the whole capacity is never admitted.
    pub fn admits(&self, size: usize) -> bool {
        size <= self.capacity
    }

    pub fn charge(&mut self, size: usize) {
        self.used += size;
    }

    pub fn refund(&mut self, size: usize) {
        debug_assert!(size <= self.used, "refund of {size} exceeds used {}", self.used);
        self.used -= size;
    }

    /// Moves an updated entry's charge from `old_size` to `new_size`.
    pub fn recharge(&mut self, old_size: usize, new_size: usize) {
        self.refund(old_size);
        self.charge(new_size);
    }

    pub fn over_budget(&self) -> bool {
        self.used > self.capacity
    }

    pub fn exceeds_count(&self, entries: usize) -> bool {
        entries > self.capacity
    }

    /// Replaces the threshold. Does not evict; the caller decides how.
    pub fn set_capacity(&mut self, capacity: usize) -> Result<(), ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::zero_capacity());
        }
        self.capacity = capacity;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.used = 0;
    }
}
