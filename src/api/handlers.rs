//! API Handlers
//!
//! HTTP request handlers for the cache admin endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};
use tokio::sync::Mutex;
use tracing::info;

use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::{
    CleanupResponse, ClearResponse, GuardianResponse, HealthResponse, InvalidateRequest,
    StartGuardianRequest, StatsResponse,
};
use crate::registry::CacheRegistry;
use crate::tasks::{GuardianConfig, MemoryGuardian};

/// Application state shared across all handlers.
///
/// The guardian sits behind a mutex because start and stop need `&mut`.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<CacheRegistry>,
    pub guardian: Arc<Mutex<MemoryGuardian>>,
    /// Tick interval used when a start request doesn't name one
    pub guardian_interval: Duration,
}

impl AppState {
    pub fn new(
        registry: Arc<CacheRegistry>,
        guardian: MemoryGuardian,
        guardian_interval: Duration,
    ) -> Self {
        Self {
            registry,
            guardian: Arc::new(Mutex::new(guardian)),
            guardian_interval,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Registers the default stores and a stopped guardian sampling this process.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(CacheRegistry::with_default_stores(config)),
            MemoryGuardian::new(GuardianConfig::from_config(config)),
            config.cleanup_interval(),
        )
    }
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Handler for GET /stats
///
/// Returns per-store statistics and the guardian status.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stores = state.registry.stats_all().await;
    let guardian = state.guardian.lock().await.status();

    Json(StatsResponse::new(stores, guardian))
}

/// Handler for POST /cleanup
///
/// Sweeps expired entries from every store.
pub async fn cleanup_handler(State(state): State<AppState>) -> Json<CleanupResponse> {
    let removed = state.registry.cleanup_all().await;
    let response = CleanupResponse::new(removed);
    info!(removed = response.total_removed, "Manual cleanup completed");

    Json(response)
}

/// Handler for DELETE /caches/:name
pub async fn clear_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ClearResponse>> {
    let store = state
        .registry
        .get(&name)
        .ok_or_else(|| ApiError::NotFound(name.clone()))?;

    let mut store = store.write().await;
    let removed = store.size();
    store.clear();
    info!(name = %name, removed, "Cache cleared");

    Ok(Json(ClearResponse::cleared(name, removed)))
}

/// Handler for POST /caches/:name/invalidate
///
/// Removes every key in the named store that starts with the given prefix.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<ClearResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let store = state
        .registry
        .get(&name)
        .ok_or_else(|| ApiError::NotFound(name.clone()))?;

    let removed = store.write().await.delete_prefix(&req.prefix);
    info!(name = %name, prefix = %req.prefix, removed, "Prefix invalidated");

    Ok(Json(ClearResponse::invalidated(name, &req.prefix, removed)))
}

/// Handler for POST /guardian/start
///
/// Starting a running guardian is a no-op reported as `changed: false`.
pub async fn guardian_start_handler(
    State(state): State<AppState>,
    Json(req): Json<StartGuardianRequest>,
) -> Result<Json<GuardianResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let interval = req
        .interval_secs
        .map(Duration::from_secs)
        .unwrap_or(state.guardian_interval);

    let mut guardian = state.guardian.lock().await;
    let changed = guardian.start(state.registry.clone(), interval);

    Ok(Json(GuardianResponse {
        changed,
        status: guardian.status(),
    }))
}

/// Handler for POST /guardian/stop
pub async fn guardian_stop_handler(State(state): State<AppState>) -> Json<GuardianResponse> {
    let mut guardian = state.guardian.lock().await;
    let changed = guardian.is_running();
    guardian.stop();

    Json(GuardianResponse {
        changed,
        status: guardian.status(),
    })
}
