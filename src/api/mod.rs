//! API Module
//!
//! HTTP handlers and routing for the cache admin API.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /stats` - Per-store statistics and guardian status
//! - `POST /cleanup` - Sweep expired entries
//! - `DELETE /caches/:name` - Clear one store
//! - `POST /caches/:name/invalidate` - Remove keys by prefix
//! - `POST /guardian/start`, `POST /guardian/stop` - Guardian lifecycle

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
