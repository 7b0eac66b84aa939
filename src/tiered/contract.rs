//! Asynchronous Store Contracts
//!
//! The capability traits the tiered coordinator composes.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::CacheError;

// == Async Store ==
/// Uniform asynchronous key/value contract for a cache tier.
///
/// A miss is `Ok(None)` / `Ok(false)`. `Err` means the tier itself failed.
#[async_trait]
pub trait AsyncStore<V>: Send + Sync {
    /// A short name for logs, e.g. "memory" or "remote".
    fn name(&self) -> &str;

    async fn get(&self, key: &str) -> Result<Option<V>, CacheError>;

    async fn set(&self, key: &str, value: V, ttl: Option<Duration>) -> Result<(), CacheError>;

    /// Returns whether an entry was removed.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    async fn has(&self, key: &str) -> Result<bool, CacheError>;
}

// == Remote Store ==
/// Contract an out-of-process backend would satisfy.
///
/// Same semantics as the in-process stores, across a network boundary. There is
/// no implementation in this crate; a remote tier plugs into `TieredCache` as a
/// primary through its `AsyncStore` half.
#[async_trait]
pub trait RemoteStore<V>: AsyncStore<V> {
    async fn clear(&self) -> Result<(), CacheError>;
}
