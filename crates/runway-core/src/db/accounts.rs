//! Account operations

use rusqlite::{params, OptionalExtension};
use tracing::debug;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Account, AccountType};

const ACCOUNT_COLUMNS: &str = "id, user_id, name, account_type, current_balance, created_at";

impl Database {
    /// Create or get an account for a user
    pub fn upsert_account(
        &self,
        user_id: i64,
        name: &str,
        account_type: Option<AccountType>,
    ) -> Result<i64> {
        self.require_user(user_id)?;
        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM accounts WHERE user_id = ? AND name = ?",
                params![user_id, name],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            return Ok(id);
        }

        conn.execute(
            "INSERT INTO accounts (user_id, name, account_type) VALUES (?, ?, ?)",
            params![user_id, name, account_type.map(|t| t.as_str())],
        )?;

        let id = conn.last_insert_rowid();
        debug!(user_id, account_id = id, "Created account {}", name);
        Ok(id)
    }

    /// List a user's accounts
    pub fn list_accounts(&self, user_id: i64) -> Result<Vec<Account>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM accounts WHERE user_id = ? ORDER BY name",
            ACCOUNT_COLUMNS
        ))?;

        let accounts = stmt
            .query_map(params![user_id], Self::row_to_account)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(accounts)
    }

    /// Get an account by ID
    pub fn get_account(&self, id: i64) -> Result<Option<Account>> {
        let conn = self.conn()?;
        let account = conn
            .query_row(
                &format!("SELECT {} FROM accounts WHERE id = ?", ACCOUNT_COLUMNS),
                params![id],
                Self::row_to_account,
            )
            .optional()?;

        Ok(account)
    }

    /// Record an account's current balance
    pub fn set_account_balance(&self, id: i64, balance: f64) -> Result<()> {
        if !balance.is_finite() {
            return Err(Error::Validation(format!("Invalid balance: {}", balance)));
        }

        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE accounts SET current_balance = ? WHERE id = ?",
            params![balance, id],
        )?;

        if updated == 0 {
            return Err(Error::NotFound(format!("Account {}", id)));
        }
        Ok(())
    }

    /// Sum of current balances across a user's accounts
    pub fn total_balance(&self, user_id: i64) -> Result<f64> {
        let conn = self.conn()?;
        let total: f64 = conn.query_row(
            "SELECT COALESCE(SUM(current_balance), 0.0) FROM accounts WHERE user_id = ?",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    fn row_to_account(row: &rusqlite::Row) -> rusqlite::Result<Account> {
        let account_type_str: Option<String> = row.get(3)?;
        let created_at_str: String = row.get(5)?;

        Ok(Account {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            account_type: account_type_str.and_then(|s| s.parse().ok()),
            current_balance: row.get(4)?,
            created_at: parse_datetime(&created_at_str),
        })
    }
}
