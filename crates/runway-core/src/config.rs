//! Analysis configuration
//!
//! All tunable constants of the forecasting and simulation stages live here.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Explicit path, or the override in the data dir
//!    (~/.local/share/runway/config/analysis.toml)
//! 2. Fall back to embedded defaults (compiled into binary)

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/analysis.toml");

/// Weights for the last three months of net cashflow, oldest first
pub const BASELINE_WEIGHTS: [f64; 3] = [0.3, 0.3, 0.4];

/// Uncertainty band half-width as a fraction of |baseline|
pub const UNCERTAINTY_BAND: f64 = 0.2;

/// Histories shorter than this trigger the low-data fallback
pub const MIN_HISTORY_MONTHS: usize = 2;

/// Length of the fallback forecast
pub const FALLBACK_HORIZON_MONTHS: u32 = 12;

/// Confidence forced onto results built on the fallback forecast
pub const FALLBACK_CONFIDENCE: u8 = 40;

/// Minimum projected balance for a "Safe" verdict
pub const SAFETY_BUFFER: f64 = 1000.0;

/// Forecast horizon used for decision simulation
pub const SIMULATION_LOOKAHEAD_MONTHS: u32 = 12;

pub const AVOID_CONFIDENCE: u8 = 95;
pub const CAUTION_CONFIDENCE: u8 = 80;
pub const SAFE_CONFIDENCE: u8 = 90;

/// Tolerance when checking that baseline weights sum to one
const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSettings {
    pub weights: [f64; 3],
    pub uncertainty_band: f64,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            weights: BASELINE_WEIGHTS,
            uncertainty_band: UNCERTAINTY_BAND,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FallbackSettings {
    pub min_history_months: usize,
    pub horizon_months: u32,
    pub confidence: u8,
}

impl Default for FallbackSettings {
    fn default() -> Self {
        Self {
            min_history_months: MIN_HISTORY_MONTHS,
            horizon_months: FALLBACK_HORIZON_MONTHS,
            confidence: FALLBACK_CONFIDENCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSettings {
    pub safety_buffer: f64,
    pub lookahead_months: u32,
    pub avoid_confidence: u8,
    pub caution_confidence: u8,
    pub safe_confidence: u8,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            safety_buffer: SAFETY_BUFFER,
            lookahead_months: SIMULATION_LOOKAHEAD_MONTHS,
            avoid_confidence: AVOID_CONFIDENCE,
            caution_confidence: CAUTION_CONFIDENCE,
            safe_confidence: SAFE_CONFIDENCE,
        }
    }
}

/// Complete analysis configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisConfig {
    pub forecast: ForecastSettings,
    pub fallback: FallbackSettings,
    pub simulation: SimulationSettings,
}

impl AnalysisConfig {
    /// Load from the default override location, falling back to embedded defaults
    pub fn load() -> Result<Self> {
        match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => parse_config(DEFAULT_CONFIG),
        }
    }

    /// Load from an explicit file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        parse_config(&content)
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<()> {
        let weights = &self.forecast.weights;
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(Error::Config(
                "forecast.weights must be non-negative".to_string(),
            ));
        }
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(Error::Config(format!(
                "forecast.weights must sum to 1, got {}",
                sum
            )));
        }
        if !self.forecast.uncertainty_band.is_finite() || self.forecast.uncertainty_band < 0.0 {
            return Err(Error::Config(
                "forecast.uncertainty_band must be non-negative".to_string(),
            ));
        }
        if self.fallback.min_history_months == 0 {
            return Err(Error::Config(
                "fallback.min_history_months must be at least 1".to_string(),
            ));
        }
        if self.fallback.horizon_months == 0 {
            return Err(Error::Config(
                "fallback.horizon_months must be at least 1".to_string(),
            ));
        }
        if self.simulation.lookahead_months == 0 {
            return Err(Error::Config(
                "simulation.lookahead_months must be at least 1".to_string(),
            ));
        }
        if !self.simulation.safety_buffer.is_finite() || self.simulation.safety_buffer < 0.0 {
            return Err(Error::Config(
                "simulation.safety_buffer must be non-negative".to_string(),
            ));
        }
        let confidences = [
            self.fallback.confidence,
            self.simulation.avoid_confidence,
            self.simulation.caution_confidence,
            self.simulation.safe_confidence,
        ];
        if confidences.iter().any(|c| *c > 100) {
            return Err(Error::Config("confidence values must be 0-100".to_string()));
        }
        Ok(())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("runway").join("config").join("analysis.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    forecast: Option<RawForecast>,
    fallback: Option<RawFallback>,
    simulation: Option<RawSimulation>,
}

#[derive(Debug, Deserialize)]
struct RawForecast {
    weights: Option<[f64; 3]>,
    uncertainty_band: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawFallback {
    min_history_months: Option<usize>,
    horizon_months: Option<u32>,
    confidence: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct RawSimulation {
    safety_buffer: Option<f64>,
    lookahead_months: Option<u32>,
    avoid_confidence: Option<u8>,
    caution_confidence: Option<u8>,
    safe_confidence: Option<u8>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<AnalysisConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = AnalysisConfig::default();

    if let Some(forecast) = raw.forecast {
        if let Some(weights) = forecast.weights {
            config.forecast.weights = weights;
        }
        if let Some(band) = forecast.uncertainty_band {
            config.forecast.uncertainty_band = band;
        }
    }

    if let Some(fallback) = raw.fallback {
        if let Some(min) = fallback.min_history_months {
            config.fallback.min_history_months = min;
        }
        if let Some(horizon) = fallback.horizon_months {
            config.fallback.horizon_months = horizon;
        }
        if let Some(confidence) = fallback.confidence {
            config.fallback.confidence = confidence;
        }
    }

    if let Some(sim) = raw.simulation {
        if let Some(buffer) = sim.safety_buffer {
            config.simulation.safety_buffer = buffer;
        }
        if let Some(months) = sim.lookahead_months {
            config.simulation.lookahead_months = months;
        }
        if let Some(c) = sim.avoid_confidence {
            config.simulation.avoid_confidence = c;
        }
        if let Some(c) = sim.caution_confidence {
            config.simulation.caution_confidence = c;
        }
        if let Some(c) = sim.safe_confidence {
            config.simulation.safe_confidence = c;
        }
    }

    config.validate()?;
    Ok(config)
}
