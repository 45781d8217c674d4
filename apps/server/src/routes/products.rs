//! Product routes, including CSV bulk import.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::events::Topic;
use crate::import;
use crate::AppState;
use tillpoint_core::{validation, CoreError, Money, Product, STATUS_ACTIVE};
use tillpoint_db::repository::product::{ProductInput, ProductListing};

#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub barcode: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub supplier_price_cents: Money,
    pub retail_price_cents: Money,
    #[serde(default)]
    pub wholesale_price_cents: Money,
    #[serde(default)]
    pub reorder_level: i64,
    #[serde(default)]
    pub is_vat: i64,
    #[serde(default = "default_status")]
    pub status: i64,
    pub category_id: Option<i64>,
}

fn default_status() -> i64 {
    STATUS_ACTIVE
}

impl ProductRequest {
    fn validate(&self) -> Result<ProductInput, CoreError> {
        validation::validate_barcode(&self.barcode)?;
        validation::validate_name("name", &self.name, 100)?;
        validation::validate_non_negative_amount("supplier_price", self.supplier_price_cents)?;
        validation::validate_non_negative_amount("retail_price", self.retail_price_cents)?;
        validation::validate_non_negative_amount("wholesale_price", self.wholesale_price_cents)?;

        Ok(ProductInput {
            barcode: self.barcode.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            supplier_price_cents: self.supplier_price_cents,
            retail_price_cents: self.retail_price_cents,
            wholesale_price_cents: self.wholesale_price_cents,
            reorder_level: self.reorder_level,
            is_vat: self.is_vat,
            status: self.status,
            category_id: self.category_id,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub message: String,
    pub new_entries: usize,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update))
        .route("/remove/{id}", put(remove))
        .route("/import", post(import_csv))
}

async fn list(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<ProductListing>>> {
    Ok(Json(state.db.products().list().await?))
}

async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Product>> {
    let product = state
        .db
        .products()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product not found: {id}")))?;
    Ok(Json(product))
}

async fn create(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ProductRequest>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let input = request.validate()?;
    let product = state.db.products().create(&input).await?;
    state
        .events
        .publish(Topic::Product, "ProductAdded", &product);
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<ProductRequest>,
) -> ApiResult<Json<Product>> {
    let input = request.validate()?;
    let product = state.db.products().update(id, &input).await?;
    state
        .events
        .publish(Topic::Product, "ProductUpdated", &product);
    Ok(Json(product))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Product>> {
    let product = state.db.products().disable(id).await?;
    state
        .events
        .publish(Topic::Product, "ProductUpdated", &product);
    Ok(Json(product))
}

/// `POST /api/products/import` - CSV upload; all rows land or none do.
async fn import_csv(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<ImportResponse>> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("No file uploaded".to_string()));
    }

    let inputs = import::parse_products(&body)?;
    let ids = state.db.products().create_bulk(&inputs).await?;

    for id in &ids {
        if let Some(product) = state.db.products().get(*id).await? {
            state
                .events
                .publish(Topic::Product, "ProductAdded", &product);
        }
    }

    Ok(Json(ImportResponse {
        message: "CSV data imported successfully".to_string(),
        new_entries: ids.len(),
    }))
}
