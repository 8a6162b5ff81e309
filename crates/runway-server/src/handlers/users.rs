//! User handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;

use crate::{get_actor, AppError, AppState};
use runway_core::models::User;

/// Request body for creating a user
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
}

/// GET /api/users - List all users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<User>>, AppError> {
    let users = state.db.list_users()?;

    state.db.log_audit(
        &get_actor(&headers),
        "list",
        Some("user"),
        None,
        Some(&format!("count={}", users.len())),
    )?;

    Ok(Json(users))
}

/// POST /api/users - Create a user
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<User>, AppError> {
    let id = state.db.create_user(&req.name)?;

    state.db.log_audit(
        &get_actor(&headers),
        "create",
        Some("user"),
        Some(id),
        Some(&format!("name={}", req.name.trim())),
    )?;

    let user = state
        .db
        .get_user(id)?
        .ok_or_else(|| AppError::internal("User not found after creation"))?;

    Ok(Json(user))
}

/// GET /api/users/:id - Get a single user
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<User>, AppError> {
    let user = state
        .db
        .get_user(id)?
        .ok_or_else(|| AppError::not_found(&format!("User {} not found", id)))?;

    state
        .db
        .log_audit(&get_actor(&headers), "get", Some("user"), Some(id), None)?;

    Ok(Json(user))
}
