//! Location routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::events::Topic;
use crate::AppState;
use tillpoint_core::{validation, CoreError, Location, STATUS_ACTIVE};

#[derive(Debug, Deserialize)]
pub struct LocationRequest {
    pub name: String,
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

async fn list(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Location>>> {
    Ok(Json(state.db.locations().list().await?))
}

async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Location>> {
    let location = state
        .db
        .locations()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Location not found: {id}")))?;
    Ok(Json(location))
}

async fn create(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LocationRequest>,
) -> ApiResult<(StatusCode, Json<Location>)> {
    validation::validate_name("name", &request.name, 100).map_err(CoreError::from)?;

    let location = state
        .db
        .locations()
        .create(&request.name, request.status)
        .await?;
    state
        .events
        .publish(Topic::Location, "LocationAdded", &location);
    Ok((StatusCode::CREATED, Json(location)))
}

async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<LocationRequest>,
) -> ApiResult<Json<Location>> {
    validation::validate_name("name", &request.name, 100).map_err(CoreError::from)?;

    let location = state
        .db
        .locations()
        .update(id, &request.name, request.status)
        .await?;
    state
        .events
        .publish(Topic::Location, "LocationUpdated", &location);
    Ok(Json(location))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Location>> {
    let location = state.db.locations().disable(id).await?;
    state
        .events
        .publish(Topic::Location, "LocationUpdated", &location);
    Ok(Json(location))
}
