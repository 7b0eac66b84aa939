//! API Routes
//!
//! Configures the Axum router with all admin endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cleanup_handler, clear_handler, guardian_start_handler, guardian_stop_handler,
    health_handler, invalidate_handler, stats_handler, AppState,
};

/// Creates the admin router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check endpoint
/// - `GET /stats` - Per-store statistics and guardian status
/// - `POST /cleanup` - Sweep expired entries from every store
/// - `DELETE /caches/:name` - Clear one store
/// - `POST /caches/:name/invalidate` - Remove keys by prefix
/// - `POST /guardian/start` - Start the memory guardian
/// - `POST /guardian/stop` - Stop the memory guardian
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/cleanup", post(cleanup_handler))
        .route("/caches/:name", delete(clear_handler))
        .route("/caches/:name/invalidate", post(invalidate_handler))
        .route("/guardian/start", post(guardian_start_handler))
        .route("/guardian/stop", post(guardian_stop_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
