//! Net cashflow forecasting
//!
//! The forecast is a deliberately flat projection: a single baseline derived
//! from recent history is repeated for every future month, with a fixed
//! proportional uncertainty band around it.
//!
//! - 3+ months of history: weighted average of the last three months
//! - 1-2 months: plain mean
//! - no history: no forecast; callers fall back to [`LowDataFallback`]

use crate::config::{AnalysisConfig, FallbackSettings, ForecastSettings};
use crate::error::{Error, Result};
use crate::models::{
    round2, Forecast, ForecastBasis, ForecastPoint, MonthlyCashflow, Recommendation,
    SimulationResult,
};
use crate::month::YearMonth;

/// Disclosure prepended to explanations built on the fallback forecast
pub const LOW_DATA_DISCLOSURE: &str = "Limited historical data. Recommendation based on \
conservative estimates (zero future growth) + current balance. ";

/// Convert a horizon in days to whole months (at least one)
pub fn horizon_from_days(days: u32) -> u32 {
    (days / 30).max(1)
}

/// Project `horizon_months` months past the last month of `history`
pub fn forecast(
    history: &[MonthlyCashflow],
    horizon_months: u32,
    settings: &ForecastSettings,
) -> Result<Forecast> {
    if horizon_months == 0 {
        return Err(Error::EmptyData(
            "Forecast horizon must be at least one month".to_string(),
        ));
    }

    let mut sorted: Vec<&MonthlyCashflow> = history.iter().collect();
    sorted.sort_by_key(|m| m.month);

    let last_month = match sorted.last() {
        Some(last) => last.month,
        None => {
            return Err(Error::EmptyData(
                "No cashflow history to forecast from".to_string(),
            ))
        }
    };

    let values: Vec<f64> = sorted.iter().map(|m| m.net_cashflow).collect();
    let (basis, baseline) = baseline(&values, settings);

    Ok(Forecast {
        basis,
        points: project(last_month, horizon_months, baseline, settings.uncertainty_band),
    })
}

/// Pick the baseline for a non-empty series of net cashflow values
fn baseline(values: &[f64], settings: &ForecastSettings) -> (ForecastBasis, f64) {
    let n = values.len();
    if n >= 3 {
        let [w0, w1, w2] = settings.weights;
        let value = w0 * values[n - 3] + w1 * values[n - 2] + w2 * values[n - 1];
        (ForecastBasis::WeightedAverage, value)
    } else {
        let mean = values.iter().sum::<f64>() / n as f64;
        (ForecastBasis::HistoricalMean, mean)
    }
}

/// Flat projection of `baseline` over the months following `last_month`
fn project(last_month: YearMonth, months: u32, baseline: f64, band: f64) -> Vec<ForecastPoint> {
    let uncertainty = baseline.abs() * band;
    (1..=months as i64)
        .map(|offset| ForecastPoint {
            forecast_month: last_month.plus_months(offset),
            predicted_cashflow: round2(baseline),
            lower_bound: round2(baseline - uncertainty),
            upper_bound: round2(baseline + uncertainty),
        })
        .collect()
}

/// Replaces the forecast when history is too short to show a trend
#[derive(Debug, Clone)]
pub struct LowDataFallback {
    settings: FallbackSettings,
}

impl LowDataFallback {
    pub fn new(settings: FallbackSettings) -> Self {
        Self { settings }
    }

    /// Whether `history` is too short to trust
    pub fn is_triggered(&self, history: &[MonthlyCashflow]) -> bool {
        history.len() < self.settings.min_history_months
    }

    /// All-zero forecast starting the month after `today`
    pub fn forecast(&self, today: YearMonth) -> Forecast {
        Forecast {
            basis: ForecastBasis::LowDataFallback,
            points: project(today, self.settings.horizon_months, 0.0, 0.0),
        }
    }

    /// Downgrade a result computed against the fallback forecast
    ///
    /// "Safe" becomes "Caution"; every tier gets the fixed fallback
    /// confidence and the disclosure prefix.
    pub fn adjust(&self, result: SimulationResult) -> SimulationResult {
        let recommendation = match result.recommendation {
            Recommendation::Safe => Recommendation::Caution,
            other => other,
        };
        SimulationResult {
            recommendation,
            confidence: self.settings.confidence,
            explanation: format!("{}{}", LOW_DATA_DISCLOSURE, result.explanation),
            low_data: true,
            ..result
        }
    }
}

impl Default for LowDataFallback {
    fn default() -> Self {
        Self::new(FallbackSettings::default())
    }
}

/// The fallback forecast points when `history` is too short, otherwise `None`
pub fn apply_low_data_fallback(
    history: &[MonthlyCashflow],
    today: YearMonth,
    settings: &FallbackSettings,
) -> Option<Vec<ForecastPoint>> {
    let policy = LowDataFallback::new(settings.clone());
    policy
        .is_triggered(history)
        .then(|| policy.forecast(today).points)
}

/// Forecast from history, or the fallback series when history is too short
///
/// The flag is true when the fallback was used; results simulated against
/// that forecast should go through [`LowDataFallback::adjust`].
pub fn forecast_or_fallback(
    history: &[MonthlyCashflow],
    horizon_months: u32,
    today: YearMonth,
    config: &AnalysisConfig,
) -> Result<(Forecast, bool)> {
    let policy = LowDataFallback::new(config.fallback.clone());
    if policy.is_triggered(history) {
        return Ok((policy.forecast(today), true));
    }
    Ok((forecast(history, horizon_months, &config.forecast)?, false))
}
