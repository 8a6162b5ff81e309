//! Decision simulation handler

use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Json};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{get_actor, AppError, AppState};
use runway_core::models::{Decision, DecisionType, SimulationResult};
use runway_core::Planner;

/// A what-if decision to run against a user's finances
#[derive(Debug, Deserialize)]
pub struct SimulationRequest {
    pub user_id: i64,
    /// ONE_TIME, RECURRING or EMI
    pub decision_type: String,
    pub amount: f64,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub duration_months: Option<u32>,
    /// Free-form label, recorded in the audit log only
    #[serde(default)]
    pub description: Option<String>,
}

/// POST /api/simulation/run - Simulate a decision and return a recommendation
pub async fn run_simulation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<SimulationRequest>,
) -> Result<Json<SimulationResult>, AppError> {
    let decision_type: DecisionType = req.decision_type.parse()?;
    let decision = Decision::new(
        decision_type,
        req.amount,
        req.start_date,
        req.duration_months,
    )?;

    let today = chrono::Local::now().date_naive();
    let planner = Planner::new(&state.db, &state.analysis);
    let result = planner.simulate(req.user_id, &decision, today)?;

    state.db.log_audit(
        &get_actor(&headers),
        "simulate",
        Some("user"),
        Some(req.user_id),
        Some(&format!(
            "type={}, amount={:.2}, recommendation={}{}",
            decision.decision_type,
            decision.amount,
            result.recommendation,
            req.description
                .as_deref()
                .map(|d| format!(", description={}", d))
                .unwrap_or_default()
        )),
    )?;

    Ok(Json(result))
}
