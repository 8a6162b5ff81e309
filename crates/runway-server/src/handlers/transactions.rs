//! Transaction handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;

use crate::{get_actor, AppError, AppState, SuccessResponse, MAX_PAGE_LIMIT};
use runway_core::models::Transaction;

/// Query parameters for listing transactions
#[derive(Debug, Deserialize)]
pub struct TransactionQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    100
}

/// GET /api/users/:id/transactions - List a user's transactions, newest first
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    headers: HeaderMap,
    Query(params): Query<TransactionQuery>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    let limit = params.limit.clamp(1, MAX_PAGE_LIMIT);
    let offset = params.offset.max(0);

    state.db.require_user(user_id)?;
    let transactions = state.db.list_transactions(user_id, limit, offset)?;

    state.db.log_audit(
        &get_actor(&headers),
        "list",
        Some("transaction"),
        None,
        Some(&format!(
            "user_id={}, limit={}, offset={}, count={}",
            user_id,
            limit,
            offset,
            transactions.len()
        )),
    )?;

    Ok(Json(transactions))
}

/// POST /api/transactions/:id/exclude - Leave a transaction out of forecasts
pub async fn exclude_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<SuccessResponse>, AppError> {
    set_excluded(&state, &headers, id, true)
}

/// POST /api/transactions/:id/include - Count a transaction in forecasts again
pub async fn include_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<SuccessResponse>, AppError> {
    set_excluded(&state, &headers, id, false)
}

fn set_excluded(
    state: &AppState,
    headers: &HeaderMap,
    id: i64,
    excluded: bool,
) -> Result<Json<SuccessResponse>, AppError> {
    state.db.set_excluded_from_forecast(id, excluded)?;

    state.db.log_audit(
        &get_actor(headers),
        if excluded { "exclude" } else { "include" },
        Some("transaction"),
        Some(id),
        None,
    )?;

    Ok(Json(SuccessResponse { success: true }))
}
