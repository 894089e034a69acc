//! Hit, miss, and eviction tallies.
//!
//! `hits` and `misses` count [`LruDict::get`](crate::LruDict::get)-style
//! lookups only; peeks, membership tests, and iteration are free.
//! `clear` resets the lookup counters but leaves `evictions` alone.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StatsCounter {
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl StatsCounter {
    #[inline]
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    #[inline]
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    #[inline]
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Zeroes hits and misses. Evictions survive.
    pub fn reset_lookups(&mut self) {
        self.hits = 0;
        self.misses = 0;
    }

    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
        }
    }
}

/// Point-in-time copy of a cache's counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheStats {
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    /// Hit rate in percent; 0 when nothing has been looked up.
    pub fn hit_rate(&self) -> f64 {
        match self.lookups() {
            0 => 0.,
            n => self.hits as f64 / n as f64 * 100.,
        }
    }
}

impl From<CacheStats> for (u64, u64, u64) {
    fn from(stats: CacheStats) -> Self {
        (stats.hits, stats.misses, stats.evictions)
    }
}
