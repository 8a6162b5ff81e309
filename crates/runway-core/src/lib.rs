//! Runway Core Library
//!
//! Cashflow forecasting and decision simulation:
//! - Monthly cashflow aggregation
//! - Flat-baseline forecasting with a low-data fallback
//! - What-if simulation of one-time, recurring and installment costs
//! - Database access and migrations
//! - CSV import of bank transaction exports
//! - Per-user planning that ties the stages to stored data

pub mod cashflow;
pub mod config;
pub mod db;
pub mod error;
pub mod forecast;
pub mod import;
pub mod models;
pub mod month;
pub mod planner;
pub mod simulate;

pub use cashflow::{aggregate_monthly, normalize, InvalidDirectionPolicy, Normalized};
pub use config::AnalysisConfig;
pub use db::{AuditEntry, Database, ImportSummary};
pub use error::{Error, Result};
pub use forecast::{apply_low_data_fallback, forecast, forecast_or_fallback, LowDataFallback};
pub use month::YearMonth;
pub use planner::Planner;
pub use simulate::simulate;
