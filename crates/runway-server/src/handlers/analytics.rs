//! Cashflow analytics handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{get_actor, AppError, AppState};
use runway_core::models::{CashflowSummaryRow, Forecast, ForecastBasis};
use runway_core::Planner;

/// Longest forecast window accepted, in days
const MAX_FORECAST_DAYS: u32 = 3650;

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    #[serde(default = "default_days")]
    pub days: u32,
}

fn default_days() -> u32 {
    30
}

#[derive(Debug, Serialize)]
pub struct ForecastDataPoint {
    /// First day of the forecast month
    pub date: NaiveDate,
    pub predicted_balance: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    pub scenario_name: String,
    pub basis: ForecastBasis,
    pub data_points: Vec<ForecastDataPoint>,
}

impl From<Forecast> for ForecastResponse {
    fn from(forecast: Forecast) -> Self {
        Self {
            scenario_name: forecast.basis.scenario_name().to_string(),
            basis: forecast.basis,
            data_points: forecast
                .points
                .into_iter()
                .map(|p| ForecastDataPoint {
                    date: p.forecast_month.first_day(),
                    predicted_balance: p.predicted_cashflow,
                    lower_bound: p.lower_bound,
                    upper_bound: p.upper_bound,
                })
                .collect(),
        }
    }
}

/// GET /api/analytics/cashflow/:user_id - Monthly income, expense and net
pub async fn get_cashflow_summary(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Vec<CashflowSummaryRow>>, AppError> {
    let planner = Planner::new(&state.db, &state.analysis);
    let summary = planner.cashflow_summary(user_id)?;

    state.db.log_audit(
        &get_actor(&headers),
        "cashflow_summary",
        Some("user"),
        Some(user_id),
        Some(&format!("months={}", summary.len())),
    )?;

    Ok(Json(summary))
}

/// GET /api/analytics/forecast/:user_id?days=30 - Projected monthly cashflow
pub async fn get_cashflow_forecast(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    headers: HeaderMap,
    Query(params): Query<ForecastQuery>,
) -> Result<Json<ForecastResponse>, AppError> {
    if params.days == 0 || params.days > MAX_FORECAST_DAYS {
        return Err(AppError::bad_request(&format!(
            "days must be between 1 and {}",
            MAX_FORECAST_DAYS
        )));
    }

    let today = chrono::Local::now().date_naive();
    let planner = Planner::new(&state.db, &state.analysis);
    let forecast = planner.forecast(user_id, params.days, today)?;

    state.db.log_audit(
        &get_actor(&headers),
        "forecast",
        Some("user"),
        Some(user_id),
        Some(&format!(
            "days={}, basis={}",
            params.days,
            forecast.basis.scenario_name()
        )),
    )?;

    Ok(Json(ForecastResponse::from(forecast)))
}
