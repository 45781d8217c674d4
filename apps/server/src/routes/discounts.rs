//! Discount routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::events::Topic;
use crate::AppState;
use tillpoint_core::{validation, CoreError, Discount, STATUS_ACTIVE};

#[derive(Debug, Deserialize)]
pub struct DiscountRequest {
    pub name: String,
    pub percentage: i64,
    #[serde(default = "default_status")]
    pub status: i64,
}

fn default_status() -> i64 {
    STATUS_ACTIVE
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update))
        .route("/remove/{id}", put(remove))
}

async fn list(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Discount>>> {
    Ok(Json(state.db.discounts().list().await?))
}

async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Discount>> {
    let discount = state
        .db
        .discounts()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Discount not found: {id}")))?;
    Ok(Json(discount))
}

async fn create(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DiscountRequest>,
) -> ApiResult<(StatusCode, Json<Discount>)> {
    validation::validate_name("name", &request.name, 100).map_err(CoreError::from)?;
    validation::validate_percentage(request.percentage).map_err(CoreError::from)?;

    let discount = state
        .db
        .discounts()
        .create(&request.name, request.percentage, request.status)
        .await?;
    state
        .events
        .publish(Topic::Discount, "DiscountAdded", &discount);
    Ok((StatusCode::CREATED, Json(discount)))
}

async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<DiscountRequest>,
) -> ApiResult<Json<Discount>> {
    validation::validate_name("name", &request.name, 100).map_err(CoreError::from)?;
    validation::validate_percentage(request.percentage).map_err(CoreError::from)?;

    let discount = state
        .db
        .discounts()
        .update(id, &request.name, request.percentage, request.status)
        .await?;
    state
        .events
        .publish(Topic::Discount, "DiscountUpdated", &discount);
    Ok(Json(discount))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Discount>> {
    let discount = state.db.discounts().disable(id).await?;
    state
        .events
        .publish(Topic::Discount, "DiscountUpdated", &discount);
    Ok(Json(discount))
}
