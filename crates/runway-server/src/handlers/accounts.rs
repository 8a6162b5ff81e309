//! Account management handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;

use crate::{get_actor, AppError, AppState};
use runway_core::models::{Account, AccountType};

/// Request body for creating an account
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub user_id: i64,
    pub name: String,
    pub account_type: Option<String>,
}

/// Request body for setting an account balance
#[derive(Debug, Deserialize)]
pub struct SetBalanceRequest {
    pub balance: f64,
}

/// GET /api/users/:id/accounts - List a user's accounts
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Vec<Account>>, AppError> {
    state.db.require_user(user_id)?;
    let accounts = state.db.list_accounts(user_id)?;

    state.db.log_audit(
        &get_actor(&headers),
        "list",
        Some("account"),
        None,
        Some(&format!("user_id={}, count={}", user_id, accounts.len())),
    )?;

    Ok(Json(accounts))
}

/// POST /api/accounts - Create (or fetch) an account
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateAccountRequest>,
) -> Result<Json<Account>, AppError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("Account name must not be empty"));
    }

    let account_type: Option<AccountType> = req
        .account_type
        .as_deref()
        .map(|t| t.parse::<AccountType>())
        .transpose()
        .map_err(|e: String| AppError::bad_request(&e))?;

    let account_id = state.db.upsert_account(req.user_id, name, account_type)?;

    state.db.log_audit(
        &get_actor(&headers),
        "create",
        Some("account"),
        Some(account_id),
        Some(&format!("user_id={}, name={}", req.user_id, name)),
    )?;

    let account = state
        .db
        .get_account(account_id)?
        .ok_or_else(|| AppError::internal("Account not found after creation"))?;

    Ok(Json(account))
}

/// PUT /api/accounts/:id/balance - Record the current balance
pub async fn set_account_balance(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<SetBalanceRequest>,
) -> Result<Json<Account>, AppError> {
    state.db.set_account_balance(id, req.balance)?;

    state.db.log_audit(
        &get_actor(&headers),
        "update",
        Some("account"),
        Some(id),
        Some(&format!("balance={:.2}", req.balance)),
    )?;

    let account = state
        .db
        .get_account(id)?
        .ok_or_else(|| AppError::not_found(&format!("Account {} not found", id)))?;

    Ok(Json(account))
}
