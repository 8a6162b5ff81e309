//! Planner - per-user orchestration of the analysis stages
//!
//! Fetches a user's transactions and balances, then runs them through
//! aggregation, forecasting (or the low-data fallback) and simulation. The
//! caller supplies "today" so results are reproducible.

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::cashflow::{aggregate_monthly, recent};
use crate::config::AnalysisConfig;
use crate::db::Database;
use crate::forecast::{forecast, forecast_or_fallback, horizon_from_days, LowDataFallback};
use crate::models::{CashflowSummaryRow, Decision, Forecast, MonthlyCashflow, SimulationResult};
use crate::month::YearMonth;
use crate::simulate::simulate;
use crate::Result;

/// Months of history returned by the cashflow summary
pub const SUMMARY_MONTHS: usize = 12;

pub struct Planner<'a> {
    db: &'a Database,
    config: &'a AnalysisConfig,
}

impl<'a> Planner<'a> {
    pub fn new(db: &'a Database, config: &'a AnalysisConfig) -> Self {
        Self { db, config }
    }

    /// Monthly totals for the most recent months with activity
    pub fn cashflow_summary(&self, user_id: i64) -> Result<Vec<CashflowSummaryRow>> {
        let history = self.history(user_id, true)?;
        Ok(recent(&history, SUMMARY_MONTHS)
            .iter()
            .map(CashflowSummaryRow::from)
            .collect())
    }

    /// Forecast net cashflow `days` ahead, ignoring excluded transactions
    ///
    /// With no usable history at all, the zero-growth fallback series is
    /// returned instead.
    pub fn forecast(&self, user_id: i64, days: u32, today: NaiveDate) -> Result<Forecast> {
        let history = self.history(user_id, false)?;

        if history.is_empty() {
            info!(user_id, "No cashflow history, using fallback forecast");
            let fallback = LowDataFallback::new(self.config.fallback.clone());
            return Ok(fallback.forecast(YearMonth::from_date(today)));
        }

        let horizon = horizon_from_days(days);
        debug!(user_id, months = history.len(), horizon, "Forecasting");
        forecast(&history, horizon, &self.config.forecast)
    }

    /// Simulate a decision against the user's balance and forecast
    pub fn simulate(
        &self,
        user_id: i64,
        decision: &Decision,
        today: NaiveDate,
    ) -> Result<SimulationResult> {
        decision.validate()?;
        let history = self.history(user_id, true)?;
        let balance = self.db.total_balance(user_id)?;

        let (projection, low_data) = forecast_or_fallback(
            &history,
            self.config.simulation.lookahead_months,
            YearMonth::from_date(today),
            self.config,
        )?;

        let result = simulate(balance, &projection.points, decision, &self.config.simulation)?;
        let result = if low_data {
            LowDataFallback::new(self.config.fallback.clone()).adjust(result)
        } else {
            result
        };

        info!(
            user_id,
            decision = %decision.decision_type,
            recommendation = %result.recommendation,
            low_data,
            "Simulated decision"
        );
        Ok(result)
    }

    fn history(&self, user_id: i64, include_excluded: bool) -> Result<Vec<MonthlyCashflow>> {
        self.db.require_user(user_id)?;
        let records = self.db.transaction_records(user_id, include_excluded)?;
        Ok(aggregate_monthly(&records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::parse_csv;
    use crate::models::{DecisionType, ForecastBasis, Recommendation};
    use crate::Error;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn seeded(csv: &str, balance: f64) -> (Database, i64) {
        let db = Database::in_memory().unwrap();
        let user = db.create_user("alice").unwrap();
        let account = db.upsert_account(user, "Checking", None).unwrap();
        db.set_account_balance(account, balance).unwrap();
        let txs = parse_csv(csv.as_bytes()).unwrap();
        db.import_transactions(account, &txs).unwrap();
        (db, user)
    }

    const FOUR_MONTHS: &str = "date,description,amount\n\
        2023-10-01,Salary,3000\n2023-10-15,Rent,-2000\n\
        2023-11-01,Salary,3000\n2023-11-15,Rent,-1800\n\
        2023-12-01,Salary,3000\n2023-12-15,Rent,-2200\n\
        2024-01-01,Salary,3000\n2024-01-15,Rent,-1500\n";

    #[test]
    fn test_cashflow_summary() {
        let (db, user) = seeded(FOUR_MONTHS, 0.0);
        let config = AnalysisConfig::default();
        let rows = Planner::new(&db, &config).cashflow_summary(user).unwrap();

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].month.to_string(), "2023-10");
        assert_eq!(rows[0].net, 1000.0);
        assert_eq!(rows[3].income, 3000.0);
        assert_eq!(rows[3].expense, 1500.0);
    }

    #[test]
    fn test_forecast_uses_weighted_baseline() {
        let (db, user) = seeded(FOUR_MONTHS, 0.0);
        let config = AnalysisConfig::default();
        let fc = Planner::new(&db, &config)
            .forecast(user, 180, date("2024-02-10"))
            .unwrap();

        assert_eq!(fc.basis, ForecastBasis::WeightedAverage);
        assert_eq!(fc.points.len(), 6);
        assert_eq!(fc.points[0].forecast_month.to_string(), "2024-02");
        assert_eq!(fc.points[0].predicted_cashflow, 1200.0);
    }

    #[test]
    fn test_forecast_skips_excluded_transactions() {
        let (db, user) = seeded(FOUR_MONTHS, 0.0);
        let latest = db.list_transactions(user, 1, 0).unwrap()[0].id;
        db.set_excluded_from_forecast(latest, true).unwrap();

        let config = AnalysisConfig::default();
        let fc = Planner::new(&db, &config)
            .forecast(user, 30, date("2024-02-10"))
            .unwrap();
        // January is now income-only: 0.3 * 1200 + 0.3 * 800 + 0.4 * 3000
        assert_eq!(fc.points[0].predicted_cashflow, 1800.0);
    }

    #[test]
    fn test_forecast_without_history_falls_back() {
        let db = Database::in_memory().unwrap();
        let user = db.create_user("new").unwrap();
        let config = AnalysisConfig::default();
        let fc = Planner::new(&db, &config)
            .forecast(user, 30, date("2024-05-20"))
            .unwrap();

        assert_eq!(fc.basis, ForecastBasis::LowDataFallback);
        assert_eq!(fc.points.len(), 12);
        assert_eq!(fc.points[0].forecast_month.to_string(), "2024-06");
    }

    #[test]
    fn test_unknown_user_is_not_found() {
        let db = Database::in_memory().unwrap();
        let config = AnalysisConfig::default();
        let err = Planner::new(&db, &config).cashflow_summary(99).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_simulate_with_history() {
        let (db, user) = seeded(FOUR_MONTHS, 5000.0);
        let config = AnalysisConfig::default();
        let decision =
            Decision::new(DecisionType::OneTime, 500.0, date("2024-02-01"), None).unwrap();

        let result = Planner::new(&db, &config)
            .simulate(user, &decision, date("2024-01-20"))
            .unwrap();

        assert_eq!(result.recommendation, Recommendation::Safe);
        assert!(!result.low_data);
        assert_eq!(result.trajectory.len(), 12);
        assert_eq!(result.months_affected, 1);
        // 5000 + 1200 - 500
        assert_eq!(result.lowest_balance, 5700.0);
    }

    #[test]
    fn test_simulate_low_data_downgrades_safe() {
        let csv = "date,description,amount\n2024-01-01,Salary,3000\n";
        let (db, user) = seeded(csv, 10_000.0);
        let config = AnalysisConfig::default();
        let decision =
            Decision::new(DecisionType::OneTime, 100.0, date("2024-02-01"), None).unwrap();

        let result = Planner::new(&db, &config)
            .simulate(user, &decision, date("2024-01-20"))
            .unwrap();

        assert!(result.low_data);
        assert_eq!(result.recommendation, Recommendation::Caution);
        assert_eq!(result.confidence, 40);
        assert_eq!(result.lowest_balance, 9900.0);
        assert!(result.explanation.starts_with("Limited historical data."));
    }
}
