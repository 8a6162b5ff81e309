//! Account command implementations

use anyhow::Result;
use runway_core::{db::Database, models::AccountType};

use super::{colored_amount, resolve_user};

pub fn cmd_accounts_list(db: &Database, user: &str) -> Result<()> {
    let user = resolve_user(db, user)?;
    let accounts = db.list_accounts(user.id)?;

    if accounts.is_empty() {
        println!("No accounts for {}. Add one with:", user.name);
        println!("  runway accounts --user {} add Checking", user.name);
        return Ok(());
    }

    println!();
    println!("📁 Accounts for {}", user.name);
    println!("   ─────────────────────────────────────────────");

    for account in &accounts {
        let kind = account
            .account_type
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "   {:>4}  {:<20} {:<12} {}",
            account.id,
            account.name,
            kind,
            colored_amount(account.current_balance)
        );
    }

    println!("   ─────────────────────────────────────────────");
    println!(
        "   Total balance: {}",
        colored_amount(db.total_balance(user.id)?)
    );

    Ok(())
}

pub fn cmd_accounts_add(
    db: &Database,
    user: &str,
    name: &str,
    account_type: Option<&str>,
) -> Result<i64> {
    let user = resolve_user(db, user)?;
    let account_type: Option<AccountType> = account_type
        .map(|t| t.parse::<AccountType>())
        .transpose()
        .map_err(|e| anyhow::anyhow!(e))?;

    let id = db.upsert_account(user.id, name, account_type)?;
    println!("✅ Account '{}' for {} (ID: {})", name, user.name, id);
    Ok(id)
}

pub fn cmd_accounts_balance(db: &Database, id: i64, amount: f64) -> Result<()> {
    db.set_account_balance(id, amount)?;
    println!("✅ Account {} balance set to {}", id, colored_amount(amount));
    Ok(())
}
