//! Serializing Store Module
//!
//! Holds values as JSON text inside a `BoundedStore<String>`.

use std::marker::PhantomData;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::cache::{BoundedStore, ManagedStore, StoreConfig, StoreStats, SyncStore};
use crate::error::CacheError;

// == Serializing Store ==
/// Bounded store that encodes values to JSON on write and decodes them on read.
///
/// Encoding failures drop the write (logged), so a `set` that returns does not
/// guarantee the value was stored. Text that fails to decode is treated as
/// corruption: the entry is removed and the read is a miss.
#[derive(Debug)]
pub struct SerializingStore<V> {
    inner: BoundedStore<String>,
    _marker: PhantomData<fn() -> V>,
}

impl<V> SerializingStore<V>
where
    V: Serialize + DeserializeOwned,
{
    pub fn new(config: StoreConfig<String>) -> Self {
        Self {
            inner: BoundedStore::new(config),
            _marker: PhantomData,
        }
    }

    pub fn with_capacity(max_size: usize, default_ttl: Duration) -> Self {
        Self::new(StoreConfig::new(max_size, default_ttl))
    }

    // == Set ==
    pub fn set(&mut self, key: impl Into<String>, value: &V, ttl: Option<Duration>) {
        let key = key.into();
        match serde_json::to_string(value) {
            Ok(encoded) => self.inner.set(key, encoded, ttl),
            Err(e) => {
                let err = CacheError::Serialization {
                    key,
                    message: e.to_string(),
                };
                warn!(error = %err, "Dropping cache write");
            }
        }
    }

    // == Get ==
    pub fn get(&mut self, key: &str) -> Option<V> {
        let encoded = self.inner.get(key)?;
        match serde_json::from_str(&encoded) {
            Ok(value) => Some(value),
            Err(e) => {
                let err = CacheError::Deserialization {
                    key: key.to_string(),
                    message: e.to_string(),
                };
                warn!(error = %err, "Removing corrupted cache entry");
                self.inner.delete(key);
                None
            }
        }
    }

    pub fn has(&mut self, key: &str) -> bool {
        self.inner.has(key)
    }

    pub fn delete(&mut self, key: &str) -> bool {
        self.inner.delete(key)
    }

    pub fn delete_prefix(&mut self, prefix: &str) -> usize {
        self.inner.delete_prefix(prefix)
    }

    pub fn clear(&mut self) {
        self.inner.clear()
    }

    pub fn cleanup(&mut self) -> usize {
        self.inner.cleanup()
    }

    pub fn evict_lru(&mut self) -> Option<String> {
        self.inner.evict_lru()
    }

    pub fn size(&self) -> usize {
        self.inner.size()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }

    pub fn stats(&self) -> StoreStats {
        self.inner.stats()
    }
}

// == Trait Implementations ==
impl<V> SyncStore<V> for SerializingStore<V>
where
    V: Serialize + DeserializeOwned,
{
    fn set(&mut self, key: &str, value: V, ttl: Option<Duration>) {
        SerializingStore::set(self, key, &value, ttl)
    }

    fn get(&mut self, key: &str) -> Option<V> {
        SerializingStore::get(self, key)
    }

    fn has(&mut self, key: &str) -> bool {
        SerializingStore::has(self, key)
    }

    fn delete(&mut self, key: &str) -> bool {
        SerializingStore::delete(self, key)
    }

    fn clear(&mut self) {
        SerializingStore::clear(self)
    }

    fn size(&self) -> usize {
        SerializingStore::size(self)
    }

    fn keys(&self) -> Vec<String> {
        SerializingStore::keys(self)
    }

    fn cleanup(&mut self) -> usize {
        SerializingStore::cleanup(self)
    }

    fn stats(&self) -> StoreStats {
        SerializingStore::stats(self)
    }
}

impl<V> ManagedStore for SerializingStore<V>
where
    V: Serialize + DeserializeOwned,
{
    fn cleanup(&mut self) -> usize {
        SerializingStore::cleanup(self)
    }

    fn evict_lru(&mut self) -> Option<String> {
        SerializingStore::evict_lru(self)
    }

    fn delete_prefix(&mut self, prefix: &str) -> usize {
        SerializingStore::delete_prefix(self, prefix)
    }

    fn clear(&mut self) {
        SerializingStore::clear(self)
    }

    fn size(&self) -> usize {
        SerializingStore::size(self)
    }

    fn stats(&self) -> StoreStats {
        SerializingStore::stats(self)
    }
}
