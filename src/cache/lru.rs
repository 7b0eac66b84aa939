//! Recency Ledger Module
//!
//! Tracks last-access order for LRU eviction with a monotonically increasing tick.

use std::collections::HashMap;

// == Recency Ledger ==
/// Maps each key to the tick of its most recent insertion or access.
///
/// Every touch takes a fresh tick from a monotonically increasing counter, so the
/// smallest tick always identifies the least recently used key. Finding it is a
/// linear scan, which is fine because it runs at most once per `set` at capacity.
#[derive(Debug, Default)]
pub struct RecencyLedger {
    /// Last-touch tick per key
    ticks: HashMap<String, u64>,
    /// Next tick to hand out
    counter: u64,
}

impl RecencyLedger {
    // == Constructor ==
    /// Creates a new empty ledger.
    pub fn new() -> Self {
        Self {
            ticks: HashMap::new(),
            counter: 0,
        }
    }

    // == Touch ==
    /// Marks a key as most recently used.
    pub fn touch(&mut self, key: &str) {
        self.counter += 1;
        match self.ticks.get_mut(key) {
            Some(tick) => *tick = self.counter,
            None => {
                self.ticks.insert(key.to_string(), self.counter);
            }
        }
    }

    // == Remove ==
    /// Removes a key from the ledger.
    pub fn remove(&mut self, key: &str) {
        self.ticks.remove(key);
    }

    // == Least Recent ==
    /// Returns the least recently used key without removing it.
    ///
    /// Ticks are unique, so there are no ties in practice. If two ticks were ever
    /// equal, the one met first in the map's current iteration order would win,
    /// which is stable for a given map state but not across instances.
    pub fn least_recent(&self) -> Option<&str> {
        self.ticks
            .iter()
            .min_by_key(|(_, tick)| **tick)
            .map(|(key, _)| key.as_str())
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used key.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let key = self.least_recent()?.to_string();
        self.ticks.remove(&key);
        Some(key)
    }

    // == Clear ==
    /// Forgets every key and resets the tick counter.
    pub fn clear(&mut self) {
        self.ticks.clear();
        self.counter = 0;
    }

    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    /// Iterates over tracked keys in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.ticks.keys()
    }

    /// Tick of the last touch for a key.
    pub fn tick_of(&self, key: &str) -> Option<u64> {
        self.ticks.get(key).copied()
    }
}
