//! Inventory routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::events::Topic;
use crate::AppState;
use tillpoint_core::{InventoryLevel, STATUS_ACTIVE};
use tillpoint_db::repository::inventory::{InventoryListing, PosListing};

#[derive(Debug, Deserialize)]
pub struct InventoryRequest {
    pub product_id: i64,
    pub location_id: i64,
    pub units: i64,
    #[serde(default = "default_status")]
    pub status: i64,
}

#[derive(Debug, Deserialize)]
pub struct InventoryUpdateRequest {
    pub units: i64,
    #[serde(default = "default_status")]
    pub status: i64,
}

fn default_status() -> i64 {
    STATUS_ACTIVE
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/all", get(list_detailed))
        .route("/pos/{location_id}", get(pos_listing))
        .route("/{id}", get(get_one).put(update))
        .route("/remove/{id}", put(remove))
}

async fn list(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<InventoryLevel>>> {
    Ok(Json(state.db.inventory().list().await?))
}

/// `GET /api/inventory/all` - product/location names joined in.
async fn list_detailed(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<InventoryListing>>> {
    Ok(Json(state.db.inventory().list_detailed().await?))
}

/// `GET /api/inventory/pos/{location_id}` - live stock plus sell prices for
/// the POS screen.
async fn pos_listing(
    State(state): State<Arc<AppState>>,
    Path(location_id): Path<i64>,
) -> ApiResult<Json<Vec<PosListing>>> {
    Ok(Json(state.db.inventory().pos_listing(location_id).await?))
}

async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<InventoryLevel>> {
    let level = state
        .db
        .inventory()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Inventory not found: {id}")))?;
    Ok(Json(level))
}

async fn create(
    State(state): State<Arc<AppState>>,
    Json(request): Json<InventoryRequest>,
) -> ApiResult<(StatusCode, Json<InventoryLevel>)> {
    if request.units < 0 {
        return Err(ApiError::BadRequest("units must not be negative".to_string()));
    }

    let level = state
        .db
        .inventory()
        .create(
            request.product_id,
            request.location_id,
            request.units,
            request.status,
        )
        .await?;
    state
        .events
        .publish(Topic::Inventory, "InventoryAdded", &level);
    Ok((StatusCode::CREATED, Json(level)))
}

async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<InventoryUpdateRequest>,
) -> ApiResult<Json<InventoryLevel>> {
    if request.units < 0 {
        return Err(ApiError::BadRequest("units must not be negative".to_string()));
    }

    let level = state
        .db
        .inventory()
        .update(id, request.units, request.status)
        .await?;
    state
        .events
        .publish(Topic::Inventory, "InventoryUpdated", &level);
    Ok(Json(level))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<InventoryLevel>> {
    let level = state.db.inventory().disable(id).await?;
    state
        .events
        .publish(Topic::Inventory, "InventoryUpdated", &level);
    Ok(Json(level))
}
