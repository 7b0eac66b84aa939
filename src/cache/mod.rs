//! Cache Module
//!
//! In-process stores with TTL expiration and LRU eviction.

mod contract;
mod entry;
mod lru;
mod serializing;
mod stats;
mod store;


// Re-export public types
pub use contract::{shared, ManagedStore, SharedStore, SyncStore};
pub use entry::{current_timestamp_ms, Entry};
pub use lru::RecencyLedger;
pub use serializing::SerializingStore;
pub use stats::StoreStats;
pub use store::{BoundedStore, EvictionCallback, EvictionReason, StoreConfig};
