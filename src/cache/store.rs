//! Bounded Store Module
//!
//! Main cache engine combining HashMap storage with a recency ledger and TTL expiration.

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{Entry, ManagedStore, RecencyLedger, StoreStats, SyncStore};

// == Eviction Reason ==
/// Why an entry left the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionReason {
    /// TTL elapsed, found by a read or a sweep
    Expired,
    /// Explicit `delete` or prefix invalidation
    Deleted,
    /// Removed as least recently used
    Evicted,
    /// Removed by `clear`
    Cleared,
}

impl EvictionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvictionReason::Expired => "expired",
            EvictionReason::Deleted => "deleted",
            EvictionReason::Evicted => "evicted",
            EvictionReason::Cleared => "cleared",
        }
    }
}

/// Callback invoked synchronously whenever an entry leaves the store.
pub type EvictionCallback<V> = Arc<dyn Fn(&str, &Entry<V>, EvictionReason) + Send + Sync>;

// == Store Config ==
/// Construction parameters for a `BoundedStore`.
pub struct StoreConfig<V> {
    /// Maximum number of entries, at least 1
    pub max_size: usize,
    /// TTL applied when `set` is called without one
    pub default_ttl: Duration,
    /// Optional hook notified on every removal
    pub on_evicted: Option<EvictionCallback<V>>,
}

impl<V> StoreConfig<V> {
    /// Creates a config. A zero `max_size` is raised to 1 and a zero TTL to 1 ms.
    pub fn new(max_size: usize, default_ttl: Duration) -> Self {
        if max_size == 0 {
            warn!("Store max_size must be positive, using 1");
        }
        if default_ttl.is_zero() {
            warn!("Store default TTL must be positive, using 1ms");
        }

        Self {
            max_size: max_size.max(1),
            default_ttl: default_ttl.max(Duration::from_millis(1)),
            on_evicted: None,
        }
    }

    /// Attaches an eviction callback.
    pub fn with_eviction_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str, &Entry<V>, EvictionReason) + Send + Sync + 'static,
    {
        self.on_evicted = Some(Arc::new(callback));
        self
    }
}

impl<V> Clone for StoreConfig<V> {
    fn clone(&self) -> Self {
        Self {
            max_size: self.max_size,
            default_ttl: self.default_ttl,
            on_evicted: self.on_evicted.clone(),
        }
    }
}

impl<V> fmt::Debug for StoreConfig<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("max_size", &self.max_size)
            .field("default_ttl", &self.default_ttl)
            .field("on_evicted", &self.on_evicted.is_some())
            .finish()
    }
}

// == Bounded Store ==
/// Size-bounded key/value store with per-entry TTL and LRU eviction.
///
/// The index and the recency ledger always hold exactly the same keys; every
/// mutation below updates both.
#[derive(Debug)]
pub struct BoundedStore<V> {
    /// Key-value storage
    entries: HashMap<String, Entry<V>>,
    /// Last-access order
    ledger: RecencyLedger,
    config: StoreConfig<V>,
    /// LRU evictions since creation
    evictions: u64,
}

impl<V: Clone> BoundedStore<V> {
    // == Constructor ==
    pub fn new(config: StoreConfig<V>) -> Self {
        Self {
            entries: HashMap::new(),
            ledger: RecencyLedger::new(),
            config,
            evictions: 0,
        }
    }

    /// Shorthand for a store without an eviction callback.
    pub fn with_capacity(max_size: usize, default_ttl: Duration) -> Self {
        Self::new(StoreConfig::new(max_size, default_ttl))
    }

    // == Set ==
    /// Stores a value, replacing any previous entry for the key.
    ///
    /// A replaced key is treated as a brand new insertion: it takes a fresh recency
    /// tick and its hit count restarts, rather than counting as an access of the old
    /// entry. If the store is full afterwards, one LRU eviction runs first.
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let key = key.into();

        if self.entries.remove(&key).is_some() {
            self.ledger.remove(&key);
        }

        if self.entries.len() >= self.config.max_size {
            self.evict_lru();
        }

        let entry = Entry::new(value, ttl.unwrap_or(self.config.default_ttl));
        self.entries.insert(key.clone(), entry);
        self.ledger.touch(&key);
    }

    // == Get ==
    /// Returns a clone of the value if present and live.
    ///
    /// Expired entries are removed on the way out. A hit bumps the entry's hit
    /// counter and makes it the most recently used.
    pub fn get(&mut self, key: &str) -> Option<V> {
        if self.remove_if_expired(key) {
            return None;
        }

        let entry = self.entries.get_mut(key)?;
        entry.hits += 1;
        let value = entry.data.clone();
        self.ledger.touch(key);
        Some(value)
    }

    // == Has ==
    /// Reports whether a live entry exists.
    ///
    /// Removes the entry if it has expired, but never touches recency or hits.
    pub fn has(&mut self, key: &str) -> bool {
        if self.remove_if_expired(key) {
            return false;
        }
        self.entries.contains_key(key)
    }

    // == Delete ==
    /// Removes an entry, returning whether one existed.
    pub fn delete(&mut self, key: &str) -> bool {
        self.remove_entry(key, EvictionReason::Deleted).is_some()
    }

    // == Delete Prefix ==
    /// Removes every entry whose key starts with `prefix`, returning the count.
    pub fn delete_prefix(&mut self, prefix: &str) -> usize {
        let matching: Vec<String> = self
            .entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();

        for key in &matching {
            self.remove_entry(key, EvictionReason::Deleted);
        }

        debug!(prefix, removed = matching.len(), "Invalidated keys by prefix");
        matching.len()
    }

    // == Clear ==
    /// Removes everything and resets the recency counter.
    pub fn clear(&mut self) {
        let drained: Vec<(String, Entry<V>)> = self.entries.drain().collect();
        self.ledger.clear();

        for (key, entry) in &drained {
            self.notify(key, entry, EvictionReason::Cleared);
        }
    }

    // == Cleanup Expired ==
    /// Sweeps out all expired entries, returning how many were removed.
    pub fn cleanup(&mut self) -> usize {
        let now = current_timestamp_ms();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.remove_entry(key, EvictionReason::Expired);
        }

        expired.len()
    }

    // == Evict LRU ==
    /// Removes the least recently used entry and returns its key.
    ///
    /// Linear in the number of entries.
    pub fn evict_lru(&mut self) -> Option<String> {
        let key = self.ledger.evict_oldest()?;

        if let Some(entry) = self.entries.remove(&key) {
            self.evictions += 1;
            debug!(key = %key, "Evicted least recently used entry");
            self.notify(&key, &entry, EvictionReason::Evicted);
        }

        Some(key)
    }

    // == Stats ==
    /// Returns a snapshot of occupancy and usage.
    pub fn stats(&self) -> StoreStats {
        let now = current_timestamp_ms();
        let size = self.entries.len();
        let total_hits = self.entries.values().map(|entry| entry.hits).sum();
        let average_age_ms = if size == 0 {
            0
        } else {
            let total_age: u64 = self.entries.values().map(|entry| entry.age_ms(now)).sum();
            total_age / size as u64
        };

        StoreStats {
            size,
            max_size: self.config.max_size,
            total_hits,
            average_age_ms,
            evictions: self.evictions,
        }
    }

    /// Returns the current number of entries.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of the current keys, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn max_size(&self) -> usize {
        self.config.max_size
    }

    // == Internal Helpers ==
    fn remove_if_expired(&mut self, key: &str) -> bool {
        let expired = self
            .entries
            .get(key)
            .is_some_and(|entry| entry.is_expired());

        if expired {
            self.remove_entry(key, EvictionReason::Expired);
        }
        expired
    }

    fn remove_entry(&mut self, key: &str, reason: EvictionReason) -> Option<Entry<V>> {
        let entry = self.entries.remove(key)?;
        self.ledger.remove(key);
        self.notify(key, &entry, reason);
        Some(entry)
    }

    /// Runs the eviction callback; a panic inside it is logged and contained.
    fn notify(&self, key: &str, entry: &Entry<V>, reason: EvictionReason) {
        if let Some(callback) = &self.config.on_evicted {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| callback(key, entry, reason)));
            if outcome.is_err() {
                warn!(key, reason = reason.as_str(), "Eviction callback panicked");
            }
        }
    }

    /// Index and ledger hold exactly the same keys.
    #[cfg(test)]
    pub(crate) fn is_consistent(&self) -> bool {
        self.entries.len() == self.ledger.len()
            && self.ledger.keys().all(|key| self.entries.contains_key(key))
    }

    #[cfg(test)]
    pub(crate) fn recency_tick(&self, key: &str) -> Option<u64> {
        self.ledger.tick_of(key)
    }
}

// == Trait Implementations ==
impl<V: Clone> SyncStore<V> for BoundedStore<V> {
    fn set(&mut self, key: &str, value: V, ttl: Option<Duration>) {
        BoundedStore::set(self, key, value, ttl)
    }

    fn get(&mut self, key: &str) -> Option<V> {
        BoundedStore::get(self, key)
    }

    fn has(&mut self, key: &str) -> bool {
        BoundedStore::has(self, key)
    }

    fn delete(&mut self, key: &str) -> bool {
        BoundedStore::delete(self, key)
    }

    fn clear(&mut self) {
        BoundedStore::clear(self)
    }

    fn size(&self) -> usize {
        BoundedStore::size(self)
    }

    fn keys(&self) -> Vec<String> {
        BoundedStore::keys(self)
    }

    fn cleanup(&mut self) -> usize {
        BoundedStore::cleanup(self)
    }

    fn stats(&self) -> StoreStats {
        BoundedStore::stats(self)
    }
}

impl<V: Clone + Send + Sync> ManagedStore for BoundedStore<V> {
    fn cleanup(&mut self) -> usize {
        BoundedStore::cleanup(self)
    }

    fn evict_lru(&mut self) -> Option<String> {
        BoundedStore::evict_lru(self)
    }

    fn delete_prefix(&mut self, prefix: &str) -> usize {
        BoundedStore::delete_prefix(self, prefix)
    }

    fn clear(&mut self) {
        BoundedStore::clear(self)
    }

    fn size(&self) -> usize {
        BoundedStore::size(self)
    }

    fn stats(&self) -> StoreStats {
        BoundedStore::stats(self)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::thread::sleep;

    fn store(max_size: usize) -> BoundedStore<String> {
        BoundedStore::with_capacity(max_size, Duration::from_secs(300))
    }

    #[test]
    fn test_store_new() {
        let store = store(100);
        assert_eq!(store.size(), 0);
        assert!(store.is_empty());
        assert_eq!(store.max_size(), 100);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut store: BoundedStore<u32> = BoundedStore::with_capacity(0, Duration::ZERO);
        store.set("a", 1, Some(Duration::from_secs(5)));
        store.set("b", 2, Some(Duration::from_secs(5)));
        assert_eq!(store.size(), 1);
        assert_eq!(store.get("b"), Some(2));
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = store(100);

        store.set("key1", "value1".to_string(), None);

        assert_eq!(store.get("key1"), Some("value1".to_string()));
        assert_eq!(store.size(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = store(100);
        assert_eq!(store.get("nonexistent"), None);
    }

    #[test]
    fn test_store_delete() {
        let mut store = store(100);

        store.set("key1", "value1".to_string(), None);

        assert!(store.delete("key1"));
        assert!(store.is_empty());
        assert!(!store.delete("key1"));
        assert_eq!(store.get("key1"), None);
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = store(100);

        store.set("key1", "value1".to_string(), None);
        store.set("key1", "value2".to_string(), None);

        assert_eq!(store.get("key1"), Some("value2".to_string()));
        assert_eq!(store.size(), 1);
    }

    #[test]
    fn test_overwrite_at_capacity_evicts_nothing() {
        let mut store = store(2);

        store.set("a", "1".to_string(), None);
        store.set("b", "2".to_string(), None);
        store.set("a", "3".to_string(), None);

        assert_eq!(store.size(), 2);
        assert!(store.has("a"));
        assert!(store.has("b"));
        assert_eq!(store.stats().evictions, 0);
    }

    #[test]
    fn test_store_ttl_expiration() {
        let mut store = store(100);

        store.set("k", "v".to_string(), Some(Duration::from_secs(1)));

        sleep(Duration::from_millis(500));
        assert_eq!(store.get("k"), Some("v".to_string()));
        assert_eq!(store.size(), 1);

        sleep(Duration::from_millis(1000));
        assert_eq!(store.get("k"), None);
        assert_eq!(store.size(), 0);
    }

    #[test]
    fn test_very_long_ttl_stays_live() {
        let mut store: BoundedStore<u32> = BoundedStore::with_capacity(10, Duration::from_secs(60));

        store.set("k", 1, Some(Duration::from_secs(1 << 61)));
        sleep(Duration::from_millis(20));

        assert_eq!(store.get("k"), Some(1));
        assert_eq!(store.cleanup(), 0);
    }

    #[test]
    fn test_has_removes_expired_entry() {
        let mut store = store(100);

        store.set("k", "v".to_string(), Some(Duration::from_millis(50)));
        sleep(Duration::from_millis(100));

        assert!(!store.has("k"));
        assert_eq!(store.size(), 0);
        assert!(store.is_consistent());
    }

    #[test]
    fn test_store_lru_eviction() {
        let mut store = store(2);

        store.set("a", "1".to_string(), None);
        store.set("b", "2".to_string(), None);
        store.get("a");
        store.set("c", "3".to_string(), None);

        let mut keys = store.keys();
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "c".to_string()]);
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_overwrite_resets_recency() {
        let mut store = store(2);

        store.set("a", "1".to_string(), None);
        store.set("b", "2".to_string(), None);
        // Re-setting "a" is a fresh insert, so "b" becomes the oldest
        store.set("a", "1b".to_string(), None);
        store.set("c", "3".to_string(), None);

        assert!(store.has("a"));
        assert!(!store.has("b"));
        assert!(store.has("c"));
    }

    #[test]
    fn test_overwrite_resets_hits() {
        let mut store = store(10);

        store.set("a", "1".to_string(), None);
        store.get("a");
        store.get("a");
        assert_eq!(store.stats().total_hits, 2);

        store.set("a", "2".to_string(), None);
        assert_eq!(store.stats().total_hits, 0);
    }

    #[test]
    fn test_has_does_not_touch_recency_or_hits() {
        let mut store = store(2);

        store.set("a", "1".to_string(), None);
        store.set("b", "2".to_string(), None);

        let tick_before = store.recency_tick("a");
        assert!(store.has("a"));
        assert_eq!(store.recency_tick("a"), tick_before);
        assert_eq!(store.stats().total_hits, 0);

        // "a" is still the oldest, so it is the one evicted
        store.set("c", "3".to_string(), None);
        assert!(!store.has("a"));
        assert!(store.has("b"));
    }

    #[test]
    fn test_store_stats() {
        let mut store = store(100);

        store.set("key1", "value1".to_string(), None);
        store.set("key2", "value2".to_string(), None);
        store.get("key1");
        store.get("key1");
        store.get("key2");
        store.get("nonexistent");

        let stats = store.stats();
        assert_eq!(stats.size, 2);
        assert_eq!(stats.max_size, 100);
        assert_eq!(stats.total_hits, 3);
        assert_eq!(stats.evictions, 0);
    }

    #[test]
    fn test_stats_empty_store() {
        let store = store(5);
        let stats = store.stats();
        assert_eq!(stats.size, 0);
        assert_eq!(stats.average_age_ms, 0);
    }

    #[test]
    fn test_average_age() {
        let mut store = store(10);

        store.set("a", "1".to_string(), None);
        sleep(Duration::from_millis(100));

        assert!(store.stats().average_age_ms >= 100);
    }

    #[test]
    fn test_store_cleanup_expired() {
        let mut store = store(100);

        store.set("key1", "value1".to_string(), Some(Duration::from_millis(50)));
        store.set("key2", "value2".to_string(), Some(Duration::from_secs(10)));

        sleep(Duration::from_millis(100));

        assert_eq!(store.cleanup(), 1);
        assert_eq!(store.size(), 1);
        assert!(store.has("key2"));
        assert!(store.is_consistent());
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut store = store(10);

        store.set("a", "1".to_string(), None);
        store.set("b", "2".to_string(), None);
        store.clear();

        assert!(store.is_empty());
        assert!(store.is_consistent());

        store.set("c", "3".to_string(), None);
        assert_eq!(store.recency_tick("c"), Some(1));
    }

    #[test]
    fn test_delete_prefix() {
        let mut store = store(10);

        store.set("doc:users:1", "a".to_string(), None);
        store.set("doc:users:2", "b".to_string(), None);
        store.set("doc:orders:1", "c".to_string(), None);

        assert_eq!(store.delete_prefix("doc:users:"), 2);
        assert_eq!(store.keys(), vec!["doc:orders:1".to_string()]);
        assert!(store.is_consistent());
    }

    #[test]
    fn test_evict_lru_on_empty_store() {
        let mut store = store(3);
        assert_eq!(store.evict_lru(), None);
    }

    #[test]
    fn test_eviction_callback_reasons() {
        let seen: Arc<Mutex<Vec<(String, &'static str)>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let config = StoreConfig::new(2, Duration::from_secs(60)).with_eviction_callback(
            move |key: &str, _entry: &Entry<String>, reason: EvictionReason| {
                sink.lock().unwrap().push((key.to_string(), reason.as_str()));
            },
        );
        let mut store = BoundedStore::new(config);

        store.set("a", "1".to_string(), None);
        store.set("b", "2".to_string(), None);
        store.set("c", "3".to_string(), None);
        store.delete("b");
        store.set("d", "4".to_string(), Some(Duration::from_millis(10)));
        sleep(Duration::from_millis(50));
        store.get("d");
        store.clear();

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                ("a".to_string(), "evicted"),
                ("b".to_string(), "deleted"),
                ("d".to_string(), "expired"),
                ("c".to_string(), "cleared"),
            ]
        );
    }

    #[test]
    fn test_panicking_callback_is_contained() {
        let config = StoreConfig::new(1, Duration::from_secs(60)).with_eviction_callback(
            |_key: &str, _entry: &Entry<u32>, _reason: EvictionReason| {
                panic!("callback failure");
            },
        );
        let mut store = BoundedStore::new(config);

        store.set("a", 1, None);
        store.set("b", 2, None);

        assert_eq!(store.size(), 1);
        assert_eq!(store.get("b"), Some(2));
        assert!(store.is_consistent());
    }
}
