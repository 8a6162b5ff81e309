//! Transaction operations

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use tracing::{debug, info};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Direction, NewTransaction, Transaction, TransactionRecord};

const TRANSACTION_COLUMNS: &str = "id, account_id, user_id, date, description, amount, direction, \
     excluded_from_forecast, import_hash, original_data, created_at";

/// Outcome of importing a batch of transactions into one account
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    /// Already present (same account and import hash)
    pub skipped: usize,
}

impl Database {
    /// Insert a transaction (skips duplicates based on import_hash)
    pub fn insert_transaction(&self, account_id: i64, tx: &NewTransaction) -> Result<Option<i64>> {
        let conn = self.conn()?;
        let user_id = Self::account_owner(&conn, account_id)?;
        Self::insert_with(&conn, user_id, account_id, tx)
    }

    /// Insert a batch atomically, skipping duplicates
    pub fn import_transactions(
        &self,
        account_id: i64,
        transactions: &[NewTransaction],
    ) -> Result<ImportSummary> {
        let mut conn = self.conn()?;
        let user_id = Self::account_owner(&conn, account_id)?;

        let db_tx = conn.transaction()?;
        let mut summary = ImportSummary::default();
        for tx in transactions {
            match Self::insert_with(&db_tx, user_id, account_id, tx)? {
                Some(_) => summary.imported += 1,
                None => summary.skipped += 1,
            }
        }
        db_tx.commit()?;

        info!(
            account_id,
            imported = summary.imported,
            skipped = summary.skipped,
            "Imported transactions"
        );
        Ok(summary)
    }

    fn account_owner(conn: &Connection, account_id: i64) -> Result<i64> {
        conn.query_row(
            "SELECT user_id FROM accounts WHERE id = ?",
            params![account_id],
            |row| row.get(0),
        )
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("Account {}", account_id)))
    }

    fn insert_with(
        conn: &Connection,
        user_id: i64,
        account_id: i64,
        tx: &NewTransaction,
    ) -> Result<Option<i64>> {
        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM transactions WHERE account_id = ? AND import_hash = ?",
                params![account_id, tx.import_hash],
                |row| row.get(0),
            )
            .optional()?;

        if existing.is_some() {
            debug!(account_id, hash = %tx.import_hash, "Skipping duplicate transaction");
            return Ok(None);
        }

        conn.execute(
            r#"
            INSERT INTO transactions (account_id, user_id, date, description, amount, direction, import_hash, original_data)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                account_id,
                user_id,
                tx.date.to_string(),
                tx.description,
                tx.amount,
                tx.direction.as_str(),
                tx.import_hash,
                tx.original_data,
            ],
        )?;

        Ok(Some(conn.last_insert_rowid()))
    }

    /// List a user's transactions, newest first
    pub fn list_transactions(&self, user_id: i64, limit: i64, offset: i64) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM transactions WHERE user_id = ? ORDER BY date DESC, id DESC LIMIT ? OFFSET ?",
            TRANSACTION_COLUMNS
        ))?;

        let transactions = stmt
            .query_map(params![user_id, limit, offset], Self::row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Get a single transaction by ID
    pub fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let transaction = conn
            .query_row(
                &format!("SELECT {} FROM transactions WHERE id = ?", TRANSACTION_COLUMNS),
                params![id],
                Self::row_to_transaction,
            )
            .optional()?;
        Ok(transaction)
    }

    /// The date/amount/direction view of a user's transactions used for analysis
    pub fn transaction_records(
        &self,
        user_id: i64,
        include_excluded: bool,
    ) -> Result<Vec<TransactionRecord>> {
        let conn = self.conn()?;
        let sql = if include_excluded {
            "SELECT date, amount, direction FROM transactions WHERE user_id = ? ORDER BY date"
        } else {
            "SELECT date, amount, direction FROM transactions \
             WHERE user_id = ? AND excluded_from_forecast = 0 ORDER BY date"
        };

        let mut stmt = conn.prepare(sql)?;
        let records = stmt
            .query_map(params![user_id], |row| {
                let date_str: String = row.get(0)?;
                let direction_str: String = row.get(2)?;
                Ok(TransactionRecord {
                    date: parse_date(0, &date_str)?,
                    amount: row.get(1)?,
                    direction: parse_direction(2, &direction_str)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Flag a transaction so forecasts ignore it (or clear the flag)
    pub fn set_excluded_from_forecast(&self, id: i64, excluded: bool) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE transactions SET excluded_from_forecast = ? WHERE id = ?",
            params![excluded, id],
        )?;

        if updated == 0 {
            return Err(Error::NotFound(format!("Transaction {}", id)));
        }
        Ok(())
    }

    /// Count total transactions
    pub fn count_transactions(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Column order: see `TRANSACTION_COLUMNS`
    fn row_to_transaction(row: &rusqlite::Row) -> rusqlite::Result<Transaction> {
        let date_str: String = row.get(3)?;
        let direction_str: String = row.get(6)?;
        let created_at_str: String = row.get(10)?;
        Ok(Transaction {
            id: row.get(0)?,
            account_id: row.get(1)?,
            user_id: row.get(2)?,
            date: parse_date(3, &date_str)?,
            description: row.get(4)?,
            amount: row.get(5)?,
            direction: parse_direction(6, &direction_str)?,
            excluded_from_forecast: row.get(7)?,
            import_hash: row.get(8)?,
            original_data: row.get(9)?,
            created_at: parse_datetime(&created_at_str),
        })
    }
}

fn parse_date(idx: usize, s: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn parse_direction(idx: usize, s: &str) -> rusqlite::Result<Direction> {
    s.parse::<Direction>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
