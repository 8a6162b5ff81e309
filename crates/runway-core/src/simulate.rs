//! Decision simulation
//!
//! Overlays the cost of a hypothetical decision onto a forecast, folds the
//! result into a running balance and grades the lowest point reached.

use crate::config::SimulationSettings;
use crate::error::{Error, Result};
use crate::models::{
    round2, BalancePoint, Decision, DecisionType, ForecastPoint, Recommendation, SimulationResult,
};
use crate::month::YearMonth;

/// Simulate `decision` against `forecast`, starting from `current_balance`
pub fn simulate(
    current_balance: f64,
    forecast: &[ForecastPoint],
    decision: &Decision,
    settings: &SimulationSettings,
) -> Result<SimulationResult> {
    if forecast.is_empty() {
        return Err(Error::NoForecast);
    }
    decision.validate()?;

    let start = decision.start_month();
    let mut months_affected = 0u32;

    let trajectory: Vec<BalancePoint> = forecast
        .iter()
        .map(|point| {
            let mut flow = point.predicted_cashflow;
            if applies(decision, start, point.forecast_month) {
                flow -= decision.amount;
                months_affected += 1;
            }
            (point.forecast_month, flow)
        })
        .scan(current_balance, |balance, (month, flow)| {
            *balance += flow;
            Some(BalancePoint {
                month,
                simulated_cashflow: flow,
                balance: *balance,
            })
        })
        .collect();

    let lowest = trajectory
        .iter()
        .map(|p| p.balance)
        .fold(f64::INFINITY, f64::min);

    let (recommendation, confidence, explanation) = classify(lowest, settings);

    Ok(SimulationResult {
        recommendation,
        confidence,
        explanation,
        lowest_balance: round2(lowest),
        months_affected,
        total_cost: round2(decision.amount * months_affected as f64),
        trajectory,
        low_data: false,
    })
}

/// Whether the decision's cost lands in `month`
fn applies(decision: &Decision, start: YearMonth, month: YearMonth) -> bool {
    let offset = month.months_since(start);
    if offset < 0 {
        return false;
    }
    match decision.decision_type {
        DecisionType::OneTime => offset == 0,
        DecisionType::Recurring => true,
        DecisionType::Emi => offset < decision.duration_months.unwrap_or(0) as i64,
    }
}

fn classify(lowest: f64, settings: &SimulationSettings) -> (Recommendation, u8, String) {
    if lowest < 0.0 {
        (
            Recommendation::Avoid,
            settings.avoid_confidence,
            format!(
                "This decision leads to negative balance (${}) in future months.",
                format_money(lowest)
            ),
        )
    } else if lowest < settings.safety_buffer {
        (
            Recommendation::Caution,
            settings.caution_confidence,
            format!(
                "Balance remains positive but dips below safety buffer (${}). Lowest: ${}.",
                format_money(settings.safety_buffer),
                format_money(lowest)
            ),
        )
    } else {
        (
            Recommendation::Safe,
            settings.safe_confidence,
            format!(
                "Your balance stays healthy (min ${}) throughout the period.",
                format_money(lowest)
            ),
        )
    }
}

/// Two decimals with comma thousands separators: `-1234.5` -> `-1,234.50`
pub fn format_money(value: f64) -> String {
    let formatted = format!("{:.2}", value);
    let (sign, digits) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted.as_str()),
    };
    let (whole, cents) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}{}.{}", sign, grouped, cents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn flat_forecast(start: &str, months: i64, value: f64) -> Vec<ForecastPoint> {
        let start: YearMonth = start.parse().unwrap();
        (0..months)
            .map(|i| ForecastPoint {
                forecast_month: start.plus_months(i),
                predicted_cashflow: value,
                lower_bound: value * 0.8,
                upper_bound: value * 1.2,
            })
            .collect()
    }

    fn decision(kind: DecisionType, amount: f64, start: (i32, u32), months: Option<u32>) -> Decision {
        let date = NaiveDate::from_ymd_opt(start.0, start.1, 1).unwrap();
        Decision::new(kind, amount, date, months).unwrap()
    }

    fn settings() -> SimulationSettings {
        SimulationSettings::default()
    }

    #[test]
    fn test_one_time_large_purchase_is_avoid() {
        let fc = flat_forecast("2024-02", 4, 500.0);
        let d = decision(DecisionType::OneTime, 3000.0, (2024, 2), None);
        let result = simulate(2000.0, &fc, &d, &settings()).unwrap();

        assert_eq!(result.recommendation, Recommendation::Avoid);
        assert_eq!(result.confidence, 95);
        assert_eq!(result.lowest_balance, -500.0);
        assert_eq!(result.months_affected, 1);
        assert_eq!(result.total_cost, 3000.0);
        assert_eq!(
            result.explanation,
            "This decision leads to negative balance ($-500.00) in future months."
        );
    }

    #[test]
    fn test_small_recurring_charge_is_safe() {
        let fc = flat_forecast("2024-02", 4, 500.0);
        let d = decision(DecisionType::Recurring, 20.0, (2024, 2), None);
        let result = simulate(2000.0, &fc, &d, &settings()).unwrap();

        assert_eq!(result.recommendation, Recommendation::Safe);
        assert_eq!(result.confidence, 90);
        assert_eq!(result.lowest_balance, 2480.0);
        assert_eq!(result.months_affected, 4);
        assert_eq!(result.total_cost, 80.0);
        assert_eq!(
            result.explanation,
            "Your balance stays healthy (min $2,480.00) throughout the period."
        );
    }

    #[test]
    fn test_emi_trajectory_dips_to_caution() {
        let fc = flat_forecast("2024-02", 4, 500.0);
        let d = decision(DecisionType::Emi, 1000.0, (2024, 2), Some(4));
        let result = simulate(2000.0, &fc, &d, &settings()).unwrap();

        let balances: Vec<f64> = result.trajectory.iter().map(|p| p.balance).collect();
        assert_eq!(balances, vec![1500.0, 1000.0, 500.0, 0.0]);
        assert!(result.trajectory.iter().all(|p| p.simulated_cashflow == -500.0));
        assert_eq!(result.recommendation, Recommendation::Caution);
        assert_eq!(result.confidence, 80);
        assert_eq!(result.months_affected, 4);
        assert_eq!(result.total_cost, 4000.0);
        assert_eq!(
            result.explanation,
            "Balance remains positive but dips below safety buffer ($1,000.00). Lowest: $0.00."
        );
    }

    #[test]
    fn test_emi_duration_bounds_affected_months() {
        let fc = flat_forecast("2024-01", 12, 0.0);
        let d = decision(DecisionType::Emi, 100.0, (2024, 3), Some(3));
        let result = simulate(10_000.0, &fc, &d, &settings()).unwrap();

        assert_eq!(result.months_affected, 3);
        let charged: Vec<String> = result
            .trajectory
            .iter()
            .filter(|p| p.simulated_cashflow < 0.0)
            .map(|p| p.month.to_string())
            .collect();
        assert_eq!(charged, vec!["2024-03", "2024-04", "2024-05"]);
    }

    #[test]
    fn test_emi_without_duration_affects_nothing() {
        let fc = flat_forecast("2024-02", 4, 500.0);
        let d = decision(DecisionType::Emi, 1000.0, (2024, 2), None);
        let result = simulate(2000.0, &fc, &d, &settings()).unwrap();
        assert_eq!(result.months_affected, 0);
        assert_eq!(result.total_cost, 0.0);
        assert_eq!(result.lowest_balance, 2500.0);

        let d = decision(DecisionType::Emi, 1000.0, (2024, 2), Some(0));
        assert_eq!(simulate(2000.0, &fc, &d, &settings()).unwrap().months_affected, 0);
    }

    #[test]
    fn test_start_after_forecast_window() {
        let fc = flat_forecast("2024-02", 4, 500.0);
        let d = decision(DecisionType::OneTime, 50_000.0, (2025, 1), None);
        let result = simulate(2000.0, &fc, &d, &settings()).unwrap();
        assert_eq!(result.months_affected, 0);
        assert_eq!(result.recommendation, Recommendation::Safe);
    }

    #[test]
    fn test_months_before_start_still_accumulate() {
        let fc = flat_forecast("2024-02", 3, -400.0);
        let d = decision(DecisionType::OneTime, 100.0, (2024, 4), None);
        let result = simulate(1000.0, &fc, &d, &settings()).unwrap();
        let balances: Vec<f64> = result.trajectory.iter().map(|p| p.balance).collect();
        assert_eq!(balances, vec![600.0, 200.0, -300.0]);
        assert_eq!(result.recommendation, Recommendation::Avoid);
    }

    #[test]
    fn test_one_time_mid_month_start_date() {
        let fc = flat_forecast("2024-02", 4, 0.0);
        let date = NaiveDate::from_ymd_opt(2024, 3, 17).unwrap();
        let d = Decision::new(DecisionType::OneTime, 10.0, date, None).unwrap();
        let result = simulate(5000.0, &fc, &d, &settings()).unwrap();
        assert_eq!(result.months_affected, 1);
        assert_eq!(result.trajectory[1].simulated_cashflow, -10.0);
    }

    #[test]
    fn test_empty_forecast_is_no_forecast() {
        let d = decision(DecisionType::OneTime, 10.0, (2024, 2), None);
        let err = simulate(2000.0, &[], &d, &settings()).unwrap_err();
        assert!(matches!(err, Error::NoForecast));
    }

    #[test]
    fn test_custom_safety_buffer() {
        let fc = flat_forecast("2024-02", 4, 500.0);
        let d = decision(DecisionType::Recurring, 20.0, (2024, 2), None);
        let strict = SimulationSettings {
            safety_buffer: 5000.0,
            ..SimulationSettings::default()
        };
        let result = simulate(2000.0, &fc, &d, &strict).unwrap();
        assert_eq!(result.recommendation, Recommendation::Caution);
        assert!(result.explanation.contains("($5,000.00)"));
    }

    #[test]
    fn test_simulate_is_idempotent() {
        let fc = flat_forecast("2024-02", 12, 731.37);
        let d = decision(DecisionType::Emi, 412.5, (2024, 5), Some(6));
        let a = simulate(1234.56, &fc, &d, &settings()).unwrap();
        let b = simulate(1234.56, &fc, &d, &settings()).unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(0.0), "0.00");
        assert_eq!(format_money(999.999), "1,000.00");
        assert_eq!(format_money(1000.0), "1,000.00");
        assert_eq!(format_money(-500.0), "-500.00");
        assert_eq!(format_money(1_234_567.891), "1,234,567.89");
        assert_eq!(format_money(-12_345.6), "-12,345.60");
        assert_eq!(format_money(100.0), "100.00");
    }
}
