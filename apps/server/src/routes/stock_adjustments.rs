//! Stock adjustment routes.

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::events::Topic;
use crate::import;
use crate::AppState;
use tillpoint_core::{CoreError, StockAction};
use tillpoint_db::repository::stock::{AdjustmentListing, AdjustmentReceipt, StockAdjustmentInput};

#[derive(Debug, Deserialize)]
pub struct AdjustmentRequest {
    pub product_id: i64,
    pub units: i64,
    pub reason: String,
    pub user_id: i64,
    pub location_id: i64,
    pub action: i64,
}

#[derive(Debug, Serialize)]
pub struct AdjustmentResponse {
    pub message: String,
    #[serde(flatten)]
    pub receipt: AdjustmentReceipt,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub message: String,
    pub rows: usize,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(adjust))
        .route("/import", post(import_csv))
        .route("/all", get(list))
}

/// `POST /api/stock-adjustments` - apply one signed inventory correction.
async fn adjust(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AdjustmentRequest>,
) -> ApiResult<Json<AdjustmentResponse>> {
    let action = StockAction::from_code(request.action)
        .ok_or(CoreError::InvalidStockAction(request.action))?;

    let receipt = state
        .db
        .stock()
        .adjust(StockAdjustmentInput {
            product_id: request.product_id,
            units: request.units,
            reason: request.reason,
            user_id: request.user_id,
            location_id: request.location_id,
            action,
        })
        .await?;

    state
        .events
        .publish(Topic::StockAdjustment, "StockAdjustmentAdded", &receipt);

    Ok(Json(AdjustmentResponse {
        message: "Inventory adjustment completed successfully".to_string(),
        receipt,
    }))
}

/// `POST /api/stock-adjustments/import` - CSV upload; all rows land or
/// none do.
async fn import_csv(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<ImportResponse>> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("No file uploaded".to_string()));
    }

    let inputs = import::parse_adjustments(&body)?;
    let receipts = state.db.stock().adjust_bulk(&inputs).await?;

    Ok(Json(ImportResponse {
        message: "CSV file processed successfully and inventory updated".to_string(),
        rows: receipts.len(),
    }))
}

/// `GET /api/stock-adjustments/all` - audit listing with names joined in.
async fn list(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<AdjustmentListing>>> {
    Ok(Json(state.db.stock().list_adjustments().await?))
}
