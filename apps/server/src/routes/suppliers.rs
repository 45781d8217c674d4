//! Supplier routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::events::Topic;
use crate::AppState;
use tillpoint_core::{validation, CoreError, Supplier, STATUS_ACTIVE};
use tillpoint_db::repository::supplier::SupplierInput;

#[derive(Debug, Deserialize)]
pub struct SupplierRequest {
    pub name: String,
    pub address: String,
    pub contact_person: String,
    pub contact_no: String,
    #[serde(default = "default_status")]
    pub status: i64,
}

fn default_status() -> i64 {
    STATUS_ACTIVE
}

impl SupplierRequest {
    fn validate(&self) -> Result<SupplierInput, CoreError> {
        validation::validate_name("name", &self.name, 50)?;
        validation::validate_name("address", &self.address, 150)?;
        validation::validate_name("contact_person", &self.contact_person, 50)?;
        validation::validate_name("contact_no", &self.contact_no, 50)?;

        Ok(SupplierInput {
            name: self.name.clone(),
            address: self.address.clone(),
            contact_person: self.contact_person.clone(),
            contact_no: self.contact_no.clone(),
            status: self.status,
        })
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update))
        .route("/remove/{id}", put(remove))
}

async fn list(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Supplier>>> {
    Ok(Json(state.db.suppliers().list().await?))
}

async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Supplier>> {
    let supplier = state
        .db
        .suppliers()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Supplier not found: {id}")))?;
    Ok(Json(supplier))
}

async fn create(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SupplierRequest>,
) -> ApiResult<(StatusCode, Json<Supplier>)> {
    let input = request.validate()?;
    let supplier = state.db.suppliers().create(&input).await?;
    state
        .events
        .publish(Topic::Supplier, "SupplierAdded", &supplier);
    Ok((StatusCode::CREATED, Json(supplier)))
}

async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<SupplierRequest>,
) -> ApiResult<Json<Supplier>> {
    let input = request.validate()?;
    let supplier = state.db.suppliers().update(id, &input).await?;
    state
        .events
        .publish(Topic::Supplier, "SupplierUpdated", &supplier);
    Ok(Json(supplier))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Supplier>> {
    let supplier = state.db.suppliers().disable(id).await?;
    state
        .events
        .publish(Topic::Supplier, "SupplierUpdated", &supplier);
    Ok(Json(supplier))
}
