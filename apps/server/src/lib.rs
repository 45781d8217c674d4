//! # Tillpoint Server
//!
//! HTTP JSON API for the POS back office, with real-time push to connected
//! WebSocket clients.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Client                                                             │
//! │    │  POST /api/orders (bearer token)                               │
//! │    ▼                                                                │
//! │  auth::require_auth ── 401 on missing/expired token                 │
//! │    │                                                                │
//! │    ▼                                                                │
//! │  routes::orders::create ── validates the typed request              │
//! │    │                                                                │
//! │    ▼                                                                │
//! │  tillpoint_db OrderRepository::create_order (one transaction)       │
//! │    │                                                                │
//! │    ▼                                                                │
//! │  events::EventBus::publish ── fan-out to /ws subscribers            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod import;
pub mod routes;

use std::sync::Arc;

use axum::Router;

use crate::auth::JwtManager;
use crate::config::ServerConfig;
use crate::events::EventBus;
use tillpoint_db::Database;

/// Shared application state.
pub struct AppState {
    pub db: Database,
    pub events: EventBus,
    pub jwt: JwtManager,
    pub config: ServerConfig,
}

impl AppState {
    /// Builds the shared state from a connected database and config.
    pub fn new(db: Database, config: ServerConfig) -> Arc<Self> {
        let jwt = JwtManager::new(config.jwt_secret.clone(), config.jwt_lifetime_secs);
        Arc::new(AppState {
            db,
            events: EventBus::new(),
            jwt,
            config,
        })
    }
}

/// Builds the full application router.
pub fn app(state: Arc<AppState>) -> Router {
    routes::router(state)
}
