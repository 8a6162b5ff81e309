//! Domain models for Runway

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::month::YearMonth;

/// Round to two fractional digits (cents)
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// Transactions
// ============================================================================

/// Direction of money movement for a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Income,
    Expense,
    /// Movement between the user's own accounts; excluded from cashflow
    Transfer,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = Error;

    /// Accepts the bare name or the qualified `TransactionDirection.NAME` form
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        let name = lowered
            .strip_prefix("transactiondirection.")
            .unwrap_or(&lowered);
        match name {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "transfer" => Ok(Self::Transfer),
            _ => Err(Error::Validation(format!(
                "Unknown transaction direction: {}",
                s
            ))),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated transaction as seen by the cashflow aggregator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub date: NaiveDate,
    /// Non-negative magnitude; the direction carries the sign
    pub amount: f64,
    pub direction: Direction,
}

/// A transaction whose direction has not been validated yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub date: NaiveDate,
    pub amount: f64,
    pub direction: String,
}

/// A stored transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub account_id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub description: String,
    /// Magnitude, always non-negative
    pub amount: f64,
    pub direction: Direction,
    /// Left out of forecasts (one-off windfalls, refunds, etc.)
    pub excluded_from_forecast: bool,
    /// Hash for deduplication
    pub import_hash: String,
    /// Original import data as JSON
    pub original_data: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn record(&self) -> TransactionRecord {
        TransactionRecord {
            date: self.date,
            amount: self.amount,
            direction: self.direction,
        }
    }
}

/// A new transaction to be imported (before DB insertion)
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub direction: Direction,
    pub import_hash: String,
    pub original_data: Option<String>,
}

// ============================================================================
// Users and accounts
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A financial account holding a current balance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub account_type: Option<AccountType>,
    pub current_balance: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Checking,
    Savings,
    Credit,
    Investment,
    Loan,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Savings => "savings",
            Self::Credit => "credit",
            Self::Investment => "investment",
            Self::Loan => "loan",
        }
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "checking" => Ok(Self::Checking),
            "savings" => Ok(Self::Savings),
            "credit" => Ok(Self::Credit),
            "investment" => Ok(Self::Investment),
            "loan" => Ok(Self::Loan),
            _ => Err(format!("Unknown account type: {}", s)),
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Cashflow and forecast
// ============================================================================

/// Income, expense and net totals for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCashflow {
    pub month: YearMonth,
    pub total_income: f64,
    pub total_expense: f64,
    /// Always `total_income - total_expense`
    pub net_cashflow: f64,
}

impl MonthlyCashflow {
    pub fn new(month: YearMonth, total_income: f64, total_expense: f64) -> Self {
        Self {
            month,
            total_income,
            total_expense,
            net_cashflow: total_income - total_expense,
        }
    }
}

/// Flattened monthly row returned by the cashflow summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashflowSummaryRow {
    pub month: YearMonth,
    pub income: f64,
    pub expense: f64,
    pub net: f64,
}

impl From<&MonthlyCashflow> for CashflowSummaryRow {
    fn from(m: &MonthlyCashflow) -> Self {
        Self {
            month: m.month,
            income: m.total_income,
            expense: m.total_expense,
            net: m.net_cashflow,
        }
    }
}

/// One projected month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub forecast_month: YearMonth,
    pub predicted_cashflow: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

/// How a forecast's baseline was derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastBasis {
    /// Weighted average of the last three months
    WeightedAverage,
    /// Mean of a short (one or two month) history
    HistoricalMean,
    /// Synthetic zero series used when history is too short
    LowDataFallback,
}

impl ForecastBasis {
    pub fn scenario_name(&self) -> &'static str {
        match self {
            Self::WeightedAverage => "Weighted Moving Avg (3M)",
            Self::HistoricalMean => "Historical Mean",
            Self::LowDataFallback => "Conservative Zero Growth",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub basis: ForecastBasis,
    pub points: Vec<ForecastPoint>,
}

// ============================================================================
// Decision simulation
// ============================================================================

/// Shape of a hypothetical spending decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionType {
    /// A single purchase in the start month
    #[serde(rename = "ONE_TIME")]
    OneTime,
    /// A charge every month from the start month on
    #[serde(rename = "RECURRING")]
    Recurring,
    /// Equated monthly installment for a bounded number of months
    #[serde(rename = "EMI")]
    Emi,
}

impl DecisionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneTime => "ONE_TIME",
            Self::Recurring => "RECURRING",
            Self::Emi => "EMI",
        }
    }
}

impl std::str::FromStr for DecisionType {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace('-', "_").as_str() {
            "ONE_TIME" => Ok(Self::OneTime),
            "RECURRING" => Ok(Self::Recurring),
            "EMI" => Ok(Self::Emi),
            _ => Err(Error::Validation(format!("Unknown decision type: {}", s))),
        }
    }
}

impl std::fmt::Display for DecisionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A proposed financial decision, treated as a cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub decision_type: DecisionType,
    pub amount: f64,
    pub start_date: NaiveDate,
    /// Only meaningful for EMI
    pub duration_months: Option<u32>,
}

impl Decision {
    pub fn new(
        decision_type: DecisionType,
        amount: f64,
        start_date: NaiveDate,
        duration_months: Option<u32>,
    ) -> Result<Self> {
        let decision = Self {
            decision_type,
            amount,
            start_date,
            duration_months,
        };
        decision.validate()?;
        Ok(decision)
    }

    /// Amount must be a positive, finite cost
    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(Error::Validation(format!(
                "Decision amount must be positive, got {}",
                self.amount
            )));
        }
        Ok(())
    }

    pub fn start_month(&self) -> YearMonth {
        YearMonth::from_date(self.start_date)
    }
}

/// Risk tier of a simulated decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    Safe,
    Caution,
    Avoid,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "Safe",
            Self::Caution => "Caution",
            Self::Avoid => "Avoid",
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Projected balance at the end of a forecast month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalancePoint {
    pub month: YearMonth,
    /// Predicted cashflow after the decision's cost
    pub simulated_cashflow: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub recommendation: Recommendation,
    /// 0-100
    pub confidence: u8,
    pub explanation: String,
    pub lowest_balance: f64,
    pub months_affected: u32,
    /// `amount * months_affected`
    pub total_cost: f64,
    pub trajectory: Vec<BalancePoint>,
    /// Set when the result rests on the low-data fallback forecast
    pub low_data: bool,
}
