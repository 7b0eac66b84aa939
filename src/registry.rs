//! Cache Registry
//!
//! Owns every shared store of the application so they can be handed to callers,
//! the memory guardian and the admin API explicitly.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::{
    shared, BoundedStore, ManagedStore, SerializingStore, SharedStore, StoreConfig, StoreStats,
};
use crate::config::Config;

/// Raw document bodies keyed by `doc:` keys.
pub const DOCUMENTS_STORE: &str = "documents";
/// Search results keyed by `search:` keys.
pub const SEARCHES_STORE: &str = "searches";
/// Analysis results keyed by `analysis:` keys.
pub const ANALYSES_STORE: &str = "analyses";

/// Type-erased handle the guardian and admin API operate on.
pub type ManagedHandle = Arc<RwLock<dyn ManagedStore>>;

/// A store together with the name it was registered under.
#[derive(Clone)]
pub struct RegisteredStore {
    pub name: String,
    pub store: ManagedHandle,
}

// == Cache Registry ==
/// Named collection of the process's stores.
///
/// Built by the composition root at startup, then shared behind an `Arc`.
#[derive(Clone, Default)]
pub struct CacheRegistry {
    stores: Vec<RegisteredStore>,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self { stores: Vec::new() }
    }

    // == Register ==
    /// Registers an existing shared store and hands it back.
    ///
    /// Registering a name twice replaces the earlier store.
    pub fn register<S>(
        &mut self,
        name: impl Into<String>,
        store: SharedStore<S>,
    ) -> SharedStore<S>
    where
        S: ManagedStore + 'static,
    {
        let name = name.into();
        let handle: ManagedHandle = store.clone();

        if let Some(existing) = self.stores.iter_mut().find(|s| s.name == name) {
            warn!(name = %name, "Replacing previously registered cache store");
            existing.store = handle;
        } else {
            debug!(name = %name, "Registered cache store");
            self.stores.push(RegisteredStore { name, store: handle });
        }

        store
    }

    /// Creates and registers a bounded store.
    pub fn create_store<V>(
        &mut self,
        name: impl Into<String>,
        config: StoreConfig<V>,
    ) -> SharedStore<BoundedStore<V>>
    where
        V: Clone + Send + Sync + 'static,
    {
        self.register(name, shared(BoundedStore::new(config)))
    }

    /// Creates and registers a serializing store.
    pub fn create_serializing_store<V>(
        &mut self,
        name: impl Into<String>,
        config: StoreConfig<String>,
    ) -> SharedStore<SerializingStore<V>>
    where
        V: Serialize + DeserializeOwned + 'static,
    {
        self.register(name, shared(SerializingStore::new(config)))
    }

    /// Registry holding the default application stores, each sized from `config`.
    ///
    /// Documents are kept as raw strings; searches and analyses are arbitrary
    /// JSON documents held in encoded form.
    pub fn with_default_stores(config: &Config) -> Self {
        let mut registry = Self::new();
        registry.create_store::<String>(
            DOCUMENTS_STORE,
            StoreConfig::new(config.max_entries, config.default_ttl()),
        );
        registry.create_serializing_store::<serde_json::Value>(
            SEARCHES_STORE,
            StoreConfig::new(config.max_entries, config.default_ttl()),
        );
        registry.create_serializing_store::<serde_json::Value>(
            ANALYSES_STORE,
            StoreConfig::new(config.max_entries, config.default_ttl()),
        );
        registry
    }

    // == Lookup ==
    pub fn get(&self, name: &str) -> Option<ManagedHandle> {
        self.stores
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.store.clone())
    }

    pub fn names(&self) -> Vec<String> {
        self.stores.iter().map(|s| s.name.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredStore> {
        self.stores.iter()
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    // == Bulk Operations ==
    /// Sweeps expired entries from every store, returning per-store removal counts.
    pub async fn cleanup_all(&self) -> Vec<(String, usize)> {
        let mut removed = Vec::with_capacity(self.stores.len());
        for registered in &self.stores {
            let count = registered.store.write().await.cleanup();
            removed.push((registered.name.clone(), count));
        }
        removed
    }

    /// Empties every store, returning how many entries each one held.
    pub async fn clear_all(&self) -> Vec<(String, usize)> {
        let mut removed = Vec::with_capacity(self.stores.len());
        for registered in &self.stores {
            let mut store = registered.store.write().await;
            removed.push((registered.name.clone(), store.size()));
            store.clear();
        }
        removed
    }

    /// Stats snapshot of every store, in registration order.
    pub async fn stats_all(&self) -> Vec<(String, StoreStats)> {
        let mut stats = Vec::with_capacity(self.stores.len());
        for registered in &self.stores {
            stats.push((registered.name.clone(), registered.store.read().await.stats()));
        }
        stats
    }
}
