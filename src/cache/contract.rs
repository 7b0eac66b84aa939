//! Store Contracts
//!
//! Traits shared by the in-process stores.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::cache::StoreStats;

/// A store shared between request handlers, coordinators and the memory guardian.
///
/// Every operation runs to completion under the write lock.
pub type SharedStore<S> = Arc<RwLock<S>>;

/// Wraps a store for sharing.
pub fn shared<S>(store: S) -> SharedStore<S> {
    Arc::new(RwLock::new(store))
}

// == Sync Store ==
/// Synchronous key/value contract implemented by the in-process stores.
///
/// A missing or expired key is `None`/`false`, never an error.
pub trait SyncStore<V> {
    /// Inserts or replaces a value. `None` uses the store's default TTL.
    fn set(&mut self, key: &str, value: V, ttl: Option<Duration>);

    /// Returns the value for a live key, counting a hit.
    fn get(&mut self, key: &str) -> Option<V>;

    /// Presence check that does not count as an access.
    fn has(&mut self, key: &str) -> bool;

    /// Removes a key, returning whether it existed.
    fn delete(&mut self, key: &str) -> bool;

    fn clear(&mut self);

    fn size(&self) -> usize;

    fn keys(&self) -> Vec<String>;

    /// Removes expired entries, returning how many were removed.
    fn cleanup(&mut self) -> usize;

    fn stats(&self) -> StoreStats;
}

// == Managed Store ==
/// Object-safe maintenance surface the memory guardian drives.
///
/// Lets stores of different value types share one registry.
pub trait ManagedStore: Send + Sync {
    fn cleanup(&mut self) -> usize;

    /// Removes the least recently used entry, returning its key.
    fn evict_lru(&mut self) -> Option<String>;

    /// Removes every key starting with `prefix`, returning the count.
    fn delete_prefix(&mut self, prefix: &str) -> usize;

    fn clear(&mut self);

    fn size(&self) -> usize;

    fn stats(&self) -> StoreStats;
}
