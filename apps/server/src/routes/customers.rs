//! Customer routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::events::Topic;
use crate::AppState;
use tillpoint_core::{validation, CoreError, Customer, STATUS_ACTIVE};
use tillpoint_db::repository::customer::CustomerInput;

#[derive(Debug, Deserialize)]
pub struct CustomerRequest {
    #[serde(default)]
    pub account_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub contact_no: String,
    pub email: String,
    pub card_number: Option<String>,
    #[serde(default = "default_status")]
    pub status: i64,
}

fn default_status() -> i64 {
    STATUS_ACTIVE
}

impl CustomerRequest {
    fn validate(&self) -> Result<CustomerInput, CoreError> {
        validation::validate_name("first_name", &self.first_name, 50)?;
        validation::validate_name("last_name", &self.last_name, 50)?;
        validation::validate_name("contact_no", &self.contact_no, 11)?;
        validation::validate_name("email", &self.email, 50)?;

        Ok(CustomerInput {
            account_id: self.account_id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            contact_no: self.contact_no.clone(),
            email: self.email.clone(),
            card_number: self.card_number.clone(),
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

async fn list(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Customer>>> {
    Ok(Json(state.db.customers().list().await?))
}

async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Customer>> {
    let customer = state
        .db
        .customers()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Customer not found: {id}")))?;
    Ok(Json(customer))
}

async fn create(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CustomerRequest>,
) -> ApiResult<(StatusCode, Json<Customer>)> {
    let input = request.validate()?;
    let customer = state.db.customers().create(&input).await?;
    state
        .events
        .publish(Topic::Customer, "CustomerAdded", &customer);
    Ok((StatusCode::CREATED, Json(customer)))
}

async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<CustomerRequest>,
) -> ApiResult<Json<Customer>> {
    let input = request.validate()?;
    let customer = state.db.customers().update(id, &input).await?;
    state
        .events
        .publish(Topic::Customer, "CustomerUpdated", &customer);
    Ok(Json(customer))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Customer>> {
    let customer = state.db.customers().disable(id).await?;
    state
        .events
        .publish(Topic::Customer, "CustomerUpdated", &customer);
    Ok(Json(customer))
}
