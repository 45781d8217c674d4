//! Category routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::events::Topic;
use crate::AppState;
use tillpoint_core::{validation, Category, CoreError, STATUS_ACTIVE};

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
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

async fn list(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.db.categories().list().await?))
}

async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Category>> {
    let category = state
        .db
        .categories()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Category not found: {id}")))?;
    Ok(Json(category))
}

async fn create(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CategoryRequest>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    validation::validate_name("name", &request.name, 100).map_err(CoreError::from)?;

    let category = state
        .db
        .categories()
        .create(&request.name, request.status)
        .await?;
    state
        .events
        .publish(Topic::Category, "CategoryAdded", &category);
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<CategoryRequest>,
) -> ApiResult<Json<Category>> {
    validation::validate_name("name", &request.name, 100).map_err(CoreError::from)?;

    let category = state
        .db
        .categories()
        .update(id, &request.name, request.status)
        .await?;
    state
        .events
        .publish(Topic::Category, "CategoryUpdated", &category);
    Ok(Json(category))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Category>> {
    let category = state.db.categories().disable(id).await?;
    state
        .events
        .publish(Topic::Category, "CategoryUpdated", &category);
    Ok(Json(category))
}
