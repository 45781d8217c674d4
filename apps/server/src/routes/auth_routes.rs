//! Authentication and user management routes.
//!
//! `login` and `register` are the only unauthenticated API endpoints;
//! the user CRUD below them requires a bearer token like everything else.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::auth::{hash_password, verify_password};
use crate::error::{ApiError, ApiResult};
use crate::events::Topic;
use crate::AppState;
use tillpoint_core::{validation, User, STATUS_ACTIVE};
use tillpoint_db::repository::user::UserInput;

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: i64,
    pub location_id: Option<i64>,
    pub token: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct UserRequest {
    pub username: String,
    pub password: String,
    pub name: String,
    #[serde(default = "default_role")]
    pub role: i64,
    #[serde(default = "default_status")]
    pub status: i64,
    pub location_id: Option<i64>,
}

fn default_role() -> i64 {
    1
}

fn default_status() -> i64 {
    STATUS_ACTIVE
}

// =============================================================================
// Routers
// =============================================================================

/// Routes reachable without a token.
pub fn public_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
}

/// Token-guarded user management routes.
pub fn protected_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update))
        .route("/remove/{id}", put(remove))
        .route("/locations/{location_id}", get(list_by_location))
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /api/auth/login` - verify credentials, issue a bearer token.
async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user = state
        .db
        .users()
        .find_by_username(&request.username)
        .await?;

    let user = match user {
        Some(user) if verify_password(&request.password, &user.password_hash) => user,
        // Same answer for unknown user and wrong password
        _ => return Err(ApiError::Unauthorized("Invalid credentials".to_string())),
    };

    let token = state.jwt.generate_token(user.id, &user.username)?;

    info!(user_id = user.id, username = %user.username, "Login");

    Ok(Json(LoginResponse {
        user_id: user.id,
        location_id: user.location_id,
        token,
        message: "Login successfully".to_string(),
    }))
}

/// `POST /api/auth/register` - self-service registration.
async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = create_user(&state, request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /api/auth` - list all users.
async fn list(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.db.users().list().await?))
}

/// `GET /api/auth/{id}`
async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<User>> {
    let user = state
        .db
        .users()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User not found: {id}")))?;
    Ok(Json(user))
}

/// `GET /api/auth/locations/{location_id}` - users assigned to a location.
async fn list_by_location(
    State(state): State<Arc<AppState>>,
    Path(location_id): Path<i64>,
) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.db.users().list_by_location(location_id).await?))
}

/// `POST /api/auth` - admin user creation.
async fn create(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = create_user(&state, request).await?;
    state.events.publish(Topic::User, "UserAdded", &user);
    Ok((StatusCode::CREATED, Json(user)))
}

/// `PUT /api/auth/{id}` - update a user, re-hashing the supplied password.
async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<UserRequest>,
) -> ApiResult<Json<User>> {
    validation::validate_username(&request.username).map_err(tillpoint_core::CoreError::from)?;
    validation::validate_name("name", &request.name, 100)
        .map_err(tillpoint_core::CoreError::from)?;

    let input = UserInput {
        username: request.username,
        password_hash: hash_password(&request.password)?,
        name: request.name,
        role: request.role,
        status: request.status,
        location_id: request.location_id,
    };

    let user = state.db.users().update(id, &input).await?;
    state.events.publish(Topic::User, "UserUpdated", &user);
    Ok(Json(user))
}

/// `PUT /api/auth/remove/{id}` - soft-disable a user.
async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<User>> {
    let user = state.db.users().disable(id).await?;
    state.events.publish(Topic::User, "UserUpdated", &user);
    Ok(Json(user))
}

/// Shared by register and admin creation.
async fn create_user(state: &AppState, request: UserRequest) -> ApiResult<User> {
    validation::validate_username(&request.username).map_err(tillpoint_core::CoreError::from)?;
    validation::validate_name("name", &request.name, 100)
        .map_err(tillpoint_core::CoreError::from)?;
    if request.password.is_empty() {
        return Err(ApiError::BadRequest("password is required".to_string()));
    }

    if state
        .db
        .users()
        .find_by_username(&request.username)
        .await?
        .is_some()
    {
        return Err(ApiError::BadRequest("User already exists".to_string()));
    }

    let input = UserInput {
        username: request.username,
        password_hash: hash_password(&request.password)?,
        name: request.name,
        role: request.role,
        status: request.status,
        location_id: request.location_id,
    };

    Ok(state.db.users().create(&input).await?)
}
