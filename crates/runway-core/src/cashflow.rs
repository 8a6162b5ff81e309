//! Monthly cashflow aggregation
//!
//! Turns an unordered set of transactions into an ascending series of
//! per-month income, expense and net totals. Transfers between the user's own
//! accounts are not cashflow and are dropped.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::models::{Direction, MonthlyCashflow, RawTransaction, TransactionRecord};
use crate::month::YearMonth;

/// What to do with a record whose direction is not income/expense/transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidDirectionPolicy {
    /// Fail the whole batch on the first bad record
    #[default]
    Reject,
    /// Drop bad records and keep going
    Skip,
}

/// Validated records plus how many were dropped under [`InvalidDirectionPolicy::Skip`]
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub records: Vec<TransactionRecord>,
    pub skipped: usize,
}

/// Validate raw direction strings at the ingestion boundary
pub fn normalize(raw: &[RawTransaction], policy: InvalidDirectionPolicy) -> Result<Normalized> {
    let mut records = Vec::with_capacity(raw.len());
    let mut skipped = 0;

    for (index, tx) in raw.iter().enumerate() {
        match tx.direction.parse::<Direction>() {
            Ok(direction) => records.push(TransactionRecord {
                date: tx.date,
                amount: tx.amount,
                direction,
            }),
            Err(_) if policy == InvalidDirectionPolicy::Skip => skipped += 1,
            Err(_) => {
                return Err(Error::Validation(format!(
                    "Transaction {} has unknown direction '{}'",
                    index + 1,
                    tx.direction
                )))
            }
        }
    }

    Ok(Normalized { records, skipped })
}

/// Aggregate transactions into one record per calendar month, ascending
pub fn aggregate_monthly(transactions: &[TransactionRecord]) -> Vec<MonthlyCashflow> {
    let mut totals: BTreeMap<YearMonth, (f64, f64)> = BTreeMap::new();

    for tx in transactions {
        let (income, expense) = match tx.direction {
            Direction::Income => (tx.amount, 0.0),
            Direction::Expense => (0.0, tx.amount),
            Direction::Transfer => continue,
        };
        let slot = totals
            .entry(YearMonth::from_date(tx.date))
            .or_insert((0.0, 0.0));
        slot.0 += income;
        slot.1 += expense;
    }

    totals
        .into_iter()
        .map(|(month, (income, expense))| MonthlyCashflow::new(month, income, expense))
        .collect()
}

/// Keep only the most recent `months` entries of an ascending series
pub fn recent(series: &[MonthlyCashflow], months: usize) -> &[MonthlyCashflow] {
    &series[series.len().saturating_sub(months)..]
}
