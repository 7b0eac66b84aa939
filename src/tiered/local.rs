//! Local Tier
//!
//! Adapts a shared synchronous store to the asynchronous tier contract.

use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;

use crate::cache::{SharedStore, SyncStore};
use crate::error::CacheError;
use crate::tiered::AsyncStore;

/// An in-process store seen through `AsyncStore`.
///
/// Every call resolves as soon as the store lock is acquired and never fails.
pub struct LocalTier<S, V> {
    name: String,
    store: SharedStore<S>,
    _marker: PhantomData<fn(V) -> V>,
}

impl<S, V> LocalTier<S, V> {
    pub fn new(name: impl Into<String>, store: SharedStore<S>) -> Self {
        Self {
            name: name.into(),
            store,
            _marker: PhantomData,
        }
    }

    /// The underlying shared store.
    pub fn store(&self) -> &SharedStore<S> {
        &self.store
    }
}

impl<S, V> Clone for LocalTier<S, V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            store: self.store.clone(),
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<S, V> AsyncStore<V> for LocalTier<S, V>
where
    S: SyncStore<V> + Send + Sync,
    V: Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &str) -> Result<Option<V>, CacheError> {
        Ok(self.store.write().await.get(key))
    }

    async fn set(&self, key: &str, value: V, ttl: Option<Duration>) -> Result<(), CacheError> {
        self.store.write().await.set(key, value, ttl);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.store.write().await.delete(key))
    }

    async fn has(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.store.write().await.has(key))
    }
}
