//! Route modules, one per entity, assembled into the application router.
//!
//! Everything except login, registration, and the WebSocket upgrade sits
//! behind the bearer-token middleware.

pub mod auth_routes;
pub mod categories;
pub mod customers;
pub mod discounts;
pub mod drawer;
pub mod inventory;
pub mod locations;
pub mod orders;
pub mod products;
pub mod stock_adjustments;
pub mod stock_in;
pub mod suppliers;

use std::sync::Arc;

use axum::middleware;
use axum::routing::get;
use axum::Router;

use crate::{auth, events, AppState};

/// Assembles the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .nest("/api/auth", auth_routes::protected_router())
        .nest("/api/products", products::router())
        .nest("/api/categories", categories::router())
        .nest("/api/locations", locations::router())
        .nest("/api/suppliers", suppliers::router())
        .nest("/api/discounts", discounts::router())
        .nest("/api/customers", customers::router())
        .nest("/api/inventory", inventory::router())
        .nest("/api/orders", orders::router())
        .nest("/api/cashdrawer", drawer::router())
        .nest("/api/stock-in", stock_in::router())
        .nest("/api/stock-adjustments", stock_adjustments::router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    let public = Router::new()
        .nest("/api/auth", auth_routes::public_router())
        .route("/ws", get(events::ws_handler));

    Router::new().merge(public).merge(protected).with_state(state)
}
