//! Cash drawer routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::events::Topic;
use crate::AppState;
use tillpoint_core::{CashDrawer, DrawerEntry, Money};
use tillpoint_db::repository::drawer::DrawerListing;

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct StartDrawerRequest {
    pub user_id: i64,
    pub location_id: i64,
    pub cashier: Option<String>,
    pub initial_cash_cents: Money,
}

#[derive(Debug, Deserialize)]
pub struct EndDrawerRequest {
    pub drawer_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct DrawerEntryRequest {
    pub drawer_id: i64,
    pub description: String,
    pub amount_cents: Money,
    pub remarks: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DrawerEntryResponse {
    pub message: String,
    #[serde(flatten)]
    pub entry: DrawerEntry,
}

// =============================================================================
// Router
// =============================================================================

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list))
        .route("/{id}", get(get_one))
        .route("/start", post(start))
        .route("/end", post(end))
        .route("/expense/add", post(add_expense))
        .route("/withdrawal/add", post(add_withdrawal))
        .route("/initialcash/add", post(add_cash))
        .route("/ongoing/{user_id}/{location_id}", get(ongoing))
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /api/cashdrawer` - all drawer sessions with the owning user.
async fn list(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<DrawerListing>>> {
    Ok(Json(state.db.drawers().list().await?))
}

/// `GET /api/cashdrawer/{id}`
async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<CashDrawer>> {
    let drawer = state
        .db
        .drawers()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Cash drawer not found: {id}")))?;
    Ok(Json(drawer))
}

/// `POST /api/cashdrawer/start` - open a new session for (user, location).
async fn start(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartDrawerRequest>,
) -> ApiResult<(StatusCode, Json<CashDrawer>)> {
    let drawer = state
        .db
        .drawers()
        .start(
            request.user_id,
            request.location_id,
            request.cashier,
            request.initial_cash_cents,
        )
        .await?;

    state
        .events
        .publish(Topic::CashDrawer, "CashDrawerStarted", &drawer);

    Ok((StatusCode::CREATED, Json(drawer)))
}

/// `POST /api/cashdrawer/end` - close an open session.
async fn end(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EndDrawerRequest>,
) -> ApiResult<Json<CashDrawer>> {
    let drawer = state.db.drawers().end(request.drawer_id).await?;

    state
        .events
        .publish(Topic::CashDrawer, "CashDrawerClosed", &drawer);

    Ok(Json(drawer))
}

/// `POST /api/cashdrawer/expense/add`
async fn add_expense(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DrawerEntryRequest>,
) -> ApiResult<Json<DrawerEntryResponse>> {
    let entry = state
        .db
        .drawers()
        .add_expense(
            request.drawer_id,
            request.description,
            request.amount_cents,
            request.remarks,
        )
        .await?;

    state.events.publish(Topic::CashDrawer, "ExpenseAdded", &entry);

    Ok(Json(DrawerEntryResponse {
        message: "Expense added successfully".to_string(),
        entry,
    }))
}

/// `POST /api/cashdrawer/withdrawal/add`
async fn add_withdrawal(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DrawerEntryRequest>,
) -> ApiResult<Json<DrawerEntryResponse>> {
    let entry = state
        .db
        .drawers()
        .add_withdrawal(
            request.drawer_id,
            request.description,
            request.amount_cents,
            request.remarks,
        )
        .await?;

    state
        .events
        .publish(Topic::CashDrawer, "WithdrawalAdded", &entry);

    Ok(Json(DrawerEntryResponse {
        message: "Withdrawal added successfully".to_string(),
        entry,
    }))
}

/// `POST /api/cashdrawer/initialcash/add` - cash top-up.
async fn add_cash(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DrawerEntryRequest>,
) -> ApiResult<Json<DrawerEntryResponse>> {
    let entry = state
        .db
        .drawers()
        .add_cash(
            request.drawer_id,
            request.description,
            request.amount_cents,
            request.remarks,
        )
        .await?;

    state
        .events
        .publish(Topic::CashDrawer, "InitialCashAdded", &entry);

    Ok(Json(DrawerEntryResponse {
        message: "Additional initial cash added successfully".to_string(),
        entry,
    }))
}

/// `GET /api/cashdrawer/ongoing/{user_id}/{location_id}` - the open session
/// for a cashier at a location.
async fn ongoing(
    State(state): State<Arc<AppState>>,
    Path((user_id, location_id)): Path<(i64, i64)>,
) -> ApiResult<Json<CashDrawer>> {
    let drawer = state
        .db
        .drawers()
        .open_for(user_id, location_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No ongoing cash drawer found".to_string()))?;
    Ok(Json(drawer))
}
