//! Response DTOs for the admin API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::StoreStats;
use crate::tasks::GuardianStatus;

/// Stats of one registered store
#[derive(Debug, Clone, Serialize)]
pub struct NamedStoreStats {
    pub name: String,
    /// Share of capacity in use
    pub fill_ratio: f64,
    #[serde(flatten)]
    pub stats: StoreStats,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Per-store statistics in registration order
    pub stores: Vec<NamedStoreStats>,
    /// Entries across all stores
    pub total_entries: usize,
    pub guardian: GuardianStatus,
}

impl StatsResponse {
    pub fn new(stores: Vec<(String, StoreStats)>, guardian: GuardianStatus) -> Self {
        let total_entries = stores.iter().map(|(_, stats)| stats.size).sum();
        Self {
            stores: stores
                .into_iter()
                .map(|(name, stats)| NamedStoreStats {
                    name,
                    fill_ratio: stats.fill_ratio(),
                    stats,
                })
                .collect(),
            total_entries,
            guardian,
        }
    }
}

/// Count of entries removed from one store
#[derive(Debug, Clone, Serialize)]
pub struct RemovedCount {
    pub name: String,
    pub removed: usize,
}

/// Response body for the sweep endpoint (POST /cleanup)
#[derive(Debug, Clone, Serialize)]
pub struct CleanupResponse {
    pub stores: Vec<RemovedCount>,
    pub total_removed: usize,
}

impl CleanupResponse {
    pub fn new(removed: Vec<(String, usize)>) -> Self {
        let total_removed = removed.iter().map(|(_, count)| count).sum();
        Self {
            stores: removed
                .into_iter()
                .map(|(name, removed)| RemovedCount { name, removed })
                .collect(),
            total_removed,
        }
    }
}

/// Response body for clearing or invalidating a single store
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Success message
    pub message: String,
    pub name: String,
    pub removed: usize,
}

impl ClearResponse {
    pub fn cleared(name: impl Into<String>, removed: usize) -> Self {
        let name = name.into();
        Self {
            message: format!("Cache '{}' cleared", name),
            name,
            removed,
        }
    }

    pub fn invalidated(name: impl Into<String>, prefix: &str, removed: usize) -> Self {
        let name = name.into();
        Self {
            message: format!("Invalidated prefix '{}' in cache '{}'", prefix, name),
            name,
            removed,
        }
    }
}

/// Response body for the guardian lifecycle endpoints
#[derive(Debug, Clone, Serialize)]
pub struct GuardianResponse {
    /// Whether the call changed the guardian's state
    pub changed: bool,
    pub status: GuardianStatus,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
