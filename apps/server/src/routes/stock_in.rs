//! Stock-in routes: record deliveries and bulk-import them.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::events::Topic;
use crate::import;
use crate::AppState;
use tillpoint_core::{StockIn, STATUS_ACTIVE};
use tillpoint_db::repository::stock::StockInInput;

#[derive(Debug, Deserialize)]
pub struct StockInRequest {
    pub supplier_id: i64,
    pub product_id: i64,
    pub location_id: i64,
    pub units: i64,
    pub user_id: i64,
    #[serde(default = "default_status")]
    pub status: i64,
}

fn default_status() -> i64 {
    STATUS_ACTIVE
}

#[derive(Debug, Serialize)]
pub struct StockInResponse {
    pub message: String,
    #[serde(flatten)]
    pub stock_in: StockIn,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub message: String,
    pub new_entries: usize,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create))
        .route("/import", post(import_csv))
}

/// `POST /api/stock-in` - record one delivery and add units to inventory.
async fn create(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StockInRequest>,
) -> ApiResult<(StatusCode, Json<StockInResponse>)> {
    let stock_in = state
        .db
        .stock()
        .stock_in(StockInInput {
            supplier_id: request.supplier_id,
            product_id: request.product_id,
            location_id: request.location_id,
            units: request.units,
            user_id: request.user_id,
            status: request.status,
        })
        .await?;

    state.events.publish(Topic::StockIn, "StockInAdded", &stock_in);

    Ok((
        StatusCode::CREATED,
        Json(StockInResponse {
            message: "StockIn added and inventory updated successfully".to_string(),
            stock_in,
        }),
    ))
}

/// `POST /api/stock-in/import` - CSV upload; all rows land or none do.
async fn import_csv(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<ImportResponse>> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("No file uploaded".to_string()));
    }

    let inputs = import::parse_stock_ins(&body)?;
    let count = state.db.stock().stock_in_bulk(&inputs).await?;

    Ok(Json(ImportResponse {
        message: "CSV data imported successfully".to_string(),
        new_entries: count,
    }))
}
