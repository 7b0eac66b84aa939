//! Cachekeeper - in-process caching for document services
//!
//! Bounded TTL+LRU stores, a serializing store for structured values, a tiered
//! coordinator that degrades backend failures to misses, key builders, and a
//! memory guardian that sheds entries under process memory pressure.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod keys;
pub mod models;
pub mod registry;
pub mod tasks;
pub mod tiered;

pub use api::AppState;
pub use cache::{BoundedStore, SerializingStore, StoreConfig, SyncStore};
pub use config::Config;
pub use error::CacheError;
pub use registry::CacheRegistry;
pub use tasks::{GuardianConfig, MemoryGuardian};
pub use tiered::{AsyncStore, LocalTier, TieredCache};
