//! Tiered Coordinator
//!
//! Composes a primary tier with an optional in-process fallback.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::error::CacheError;
use crate::tiered::AsyncStore;

// == Tier Outcome ==
/// What a single tier call produced.
#[derive(Debug)]
pub enum TierOutcome<T> {
    /// The tier answered with a value (or confirmed presence/removal)
    Hit(T),
    /// The tier answered but had nothing
    Miss,
    /// The tier itself failed
    Failed(CacheError),
}

impl<T> TierOutcome<T> {
    fn from_lookup(result: Result<Option<T>, CacheError>) -> Self {
        match result {
            Ok(Some(value)) => TierOutcome::Hit(value),
            Ok(None) => TierOutcome::Miss,
            Err(e) => TierOutcome::Failed(e),
        }
    }
}

impl TierOutcome<()> {
    fn from_flag(result: Result<bool, CacheError>) -> Self {
        match result {
            Ok(true) => TierOutcome::Hit(()),
            Ok(false) => TierOutcome::Miss,
            Err(e) => TierOutcome::Failed(e),
        }
    }
}

// == Tiered Cache ==
/// Primary tier plus optional fallback behind one infallible async API.
///
/// Tier failures are logged and downgraded: reads become misses, writes and
/// deletes count as attempted. Writes go to both tiers regardless of how the
/// primary fared, so the tiers may diverge; a cache is never the system of record.
pub struct TieredCache<V> {
    primary: Arc<dyn AsyncStore<V>>,
    fallback: Option<Arc<dyn AsyncStore<V>>>,
}

impl<V> Clone for TieredCache<V> {
    fn clone(&self) -> Self {
        Self {
            primary: self.primary.clone(),
            fallback: self.fallback.clone(),
        }
    }
}

impl<V> TieredCache<V>
where
    V: Clone + Send + 'static,
{
    // == Constructor ==
    pub fn new(primary: Arc<dyn AsyncStore<V>>) -> Self {
        Self {
            primary,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn AsyncStore<V>>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    // == Get ==
    /// Primary first. On a primary miss or failure, the fallback's answer is final.
    pub async fn get(&self, key: &str) -> Option<V> {
        match TierOutcome::from_lookup(self.primary.get(key).await) {
            TierOutcome::Hit(value) => return Some(value),
            TierOutcome::Miss => {}
            TierOutcome::Failed(e) => log_failure(self.primary.as_ref(), "get", key, &e),
        }

        let fallback = self.fallback.as_ref()?;
        match TierOutcome::from_lookup(fallback.get(key).await) {
            TierOutcome::Hit(value) => {
                debug!(key, tier = fallback.name(), "Served from fallback tier");
                Some(value)
            }
            TierOutcome::Miss => None,
            TierOutcome::Failed(e) => {
                log_failure(fallback.as_ref(), "get", key, &e);
                None
            }
        }
    }

    // == Set ==
    /// Writes the primary, then always the fallback.
    pub async fn set(&self, key: &str, value: V, ttl: Option<Duration>) {
        match &self.fallback {
            Some(fallback) => {
                if let Err(e) = self.primary.set(key, value.clone(), ttl).await {
                    log_failure(self.primary.as_ref(), "set", key, &e);
                }
                if let Err(e) = fallback.set(key, value, ttl).await {
                    log_failure(fallback.as_ref(), "set", key, &e);
                }
            }
            None => {
                if let Err(e) = self.primary.set(key, value, ttl).await {
                    log_failure(self.primary.as_ref(), "set", key, &e);
                }
            }
        }
    }

    // == Delete ==
    /// Attempts removal on every tier. True if any tier removed the key.
    pub async fn delete(&self, key: &str) -> bool {
        let mut removed = self.delete_from(self.primary.as_ref(), key).await;
        if let Some(fallback) = &self.fallback {
            removed |= self.delete_from(fallback.as_ref(), key).await;
        }
        removed
    }

    // == Has ==
    /// Primary first; the fallback is asked only if the primary did not confirm.
    pub async fn has(&self, key: &str) -> bool {
        match TierOutcome::from_flag(self.primary.has(key).await) {
            TierOutcome::Hit(()) => return true,
            TierOutcome::Miss => {}
            TierOutcome::Failed(e) => log_failure(self.primary.as_ref(), "has", key, &e),
        }

        let Some(fallback) = &self.fallback else {
            return false;
        };
        match TierOutcome::from_flag(fallback.has(key).await) {
            TierOutcome::Hit(()) => true,
            TierOutcome::Miss => false,
            TierOutcome::Failed(e) => {
                log_failure(fallback.as_ref(), "has", key, &e);
                false
            }
        }
    }

    async fn delete_from(&self, tier: &dyn AsyncStore<V>, key: &str) -> bool {
        match TierOutcome::from_flag(tier.delete(key).await) {
            TierOutcome::Hit(()) => true,
            TierOutcome::Miss => false,
            TierOutcome::Failed(e) => {
                log_failure(tier, "delete", key, &e);
                false
            }
        }
    }
}

/// Transient failures are expected under degradation; anything else is a defect
/// worth an error line. Both are swallowed.
fn log_failure<V>(tier: &dyn AsyncStore<V>, op: &str, key: &str, err: &CacheError) {
    if err.is_transient() {
        warn!(tier = tier.name(), op, key, error = %err, "Cache tier failed, degrading");
    } else {
        error!(
            tier = tier.name(),
            op,
            key,
            error = %err,
            "Cache tier failed permanently, degrading"
        );
    }
}
