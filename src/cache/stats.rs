//! Cache Statistics Module
//!
//! Point-in-time snapshot of a store's occupancy and usage.

use serde::Serialize;

// == Store Stats ==
/// Snapshot returned by `stats()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoreStats {
    /// Current number of entries
    pub size: usize,
    /// Configured capacity
    pub max_size: usize,
    /// Sum of hit counters over live entries
    pub total_hits: u64,
    /// Mean entry age in milliseconds, 0 when empty
    pub average_age_ms: u64,
    /// Entries removed by LRU eviction since the store was created
    pub evictions: u64,
}

impl StoreStats {
    // == Fill Ratio ==
    /// Fraction of capacity in use.
    pub fn fill_ratio(&self) -> f64 {
        if self.max_size == 0 {
            0.0
        } else {
            self.size as f64 / self.max_size as f64
        }
    }
}
