//! Import command implementation

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use runway_core::{db::Database, import::parse_csv, ImportSummary};

pub fn cmd_import(db: &Database, file: &Path, account_id: i64) -> Result<ImportSummary> {
    let account = db
        .get_account(account_id)?
        .ok_or_else(|| anyhow::anyhow!("Account not found: {}", account_id))?;

    println!(
        "📥 Importing {} into '{}'...",
        file.display(),
        account.name
    );

    let csv_file =
        File::open(file).with_context(|| format!("Failed to open file: {}", file.display()))?;
    let transactions = parse_csv(csv_file)
        .with_context(|| format!("Failed to parse CSV: {}", file.display()))?;

    println!("   Found {} transactions", transactions.len());

    let summary = db.import_transactions(account_id, &transactions)?;

    println!();
    println!("✅ Import complete!");
    println!("   Imported: {}", summary.imported);
    println!("   Skipped (duplicates): {}", summary.skipped);

    Ok(summary)
}
