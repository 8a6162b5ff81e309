//! CSV import handlers

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{get_actor, AppError, AppState, MAX_UPLOAD_SIZE};
use runway_core::import::parse_csv;

/// Result of an import request
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub account_id: i64,
    /// Rows parsed from the CSV
    pub total: usize,
    pub imported: usize,
    /// Rows already present in the account
    pub skipped: usize,
}

/// POST /api/import - Import transactions from CSV
///
/// Expects multipart form with:
/// - file: CSV file (required, max 10MB)
/// - account_id: Account ID to import into (required)
pub async fn import_csv(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<ImportResponse>, AppError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut account_id: Option<i64> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(&format!("Failed to read form field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| AppError::bad_request("Failed to read file data"))?;
                check_size(bytes.len())?;
                file_data = Some(bytes.to_vec());
            }
            "account_id" => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| AppError::bad_request("Failed to read account_id"))?;
                account_id = Some(value.trim().parse().map_err(|_| {
                    AppError::bad_request(&format!("Invalid account_id: {}", value))
                })?);
            }
            _ => {}
        }
    }

    let file_data = file_data.ok_or_else(|| AppError::bad_request("Missing file field"))?;
    let account_id = account_id.ok_or_else(|| AppError::bad_request("Missing account_id field"))?;

    import_csv_core(&state, &headers, &file_data, account_id)
}

/// Request body for importing CSV through JSON
#[derive(Debug, Deserialize)]
pub struct ImportCsvJsonRequest {
    pub account_id: i64,
    /// Base64-encoded CSV content
    pub csv_data: String,
}

/// POST /api/import/json - Import transactions from base64 CSV in a JSON body
pub async fn import_csv_json(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<ImportCsvJsonRequest>,
) -> Result<Json<ImportResponse>, AppError> {
    use base64::Engine;

    let file_data = base64::engine::general_purpose::STANDARD
        .decode(&req.csv_data)
        .map_err(|e| AppError::bad_request(&format!("Invalid base64 data: {}", e)))?;
    check_size(file_data.len())?;

    import_csv_core(&state, &headers, &file_data, req.account_id)
}

/// Parse, store and audit one CSV upload
pub fn import_csv_core(
    state: &AppState,
    headers: &HeaderMap,
    file_data: &[u8],
    account_id: i64,
) -> Result<Json<ImportResponse>, AppError> {
    if state.db.get_account(account_id)?.is_none() {
        return Err(AppError::not_found(&format!(
            "Account {} not found",
            account_id
        )));
    }

    let transactions = parse_csv(file_data)?;
    let summary = state.db.import_transactions(account_id, &transactions)?;

    info!(
        account_id,
        total = transactions.len(),
        imported = summary.imported,
        skipped = summary.skipped,
        "CSV import complete"
    );

    state.db.log_audit(
        &get_actor(headers),
        "import",
        Some("account"),
        Some(account_id),
        Some(&format!(
            "total={}, imported={}, skipped={}",
            transactions.len(),
            summary.imported,
            summary.skipped
        )),
    )?;

    Ok(Json(ImportResponse {
        account_id,
        total: transactions.len(),
        imported: summary.imported,
        skipped: summary.skipped,
    }))
}

fn check_size(len: usize) -> Result<(), AppError> {
    if len > MAX_UPLOAD_SIZE {
        return Err(AppError::bad_request(&format!(
            "File too large. Maximum size is {} MB",
            MAX_UPLOAD_SIZE / 1024 / 1024
        )));
    }
    Ok(())
}
