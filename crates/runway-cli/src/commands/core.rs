//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `load_config` - Analysis settings from --config or the default locations
//! - `resolve_user` - Look up a user by name or ID
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use runway_core::{db::Database, models::User, AnalysisConfig};
use tracing::debug;

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .with_context(|| format!("Database path is not valid UTF-8: {}", db_path.display()))?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Load analysis settings, preferring an explicit file
pub fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => {
            debug!("Loading analysis config from {}", path.display());
            AnalysisConfig::from_file(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))
        }
        None => AnalysisConfig::load().context("Failed to load analysis config"),
    }
}

/// Find a user by numeric ID or exact name
pub fn resolve_user(db: &Database, name_or_id: &str) -> Result<User> {
    if let Ok(id) = name_or_id.parse::<i64>() {
        if let Some(user) = db.get_user(id)? {
            return Ok(user);
        }
    }

    db.list_users()?
        .into_iter()
        .find(|u| u.name == name_or_id)
        .ok_or_else(|| anyhow::anyhow!("User not found: {}", name_or_id))
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Add a user: runway users add NAME");
    println!("  2. Add an account: runway accounts --user NAME add Checking");
    println!("  3. Import transactions: runway import --file statement.csv --account ID");
    println!("  4. Try a decision: runway simulate --user NAME --type one_time --amount 500 --start 2025-01-01");

    Ok(())
}
