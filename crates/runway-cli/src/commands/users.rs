//! User command implementations

use anyhow::Result;
use runway_core::db::Database;

pub fn cmd_users_list(db: &Database) -> Result<()> {
    let users = db.list_users()?;

    if users.is_empty() {
        println!("No users yet. Add one with:");
        println!("  runway users add NAME");
        return Ok(());
    }

    println!();
    println!("👤 Users");
    println!("   ─────────────────────────────");

    for user in users {
        println!("   {:>4}  {}", user.id, user.name);
    }

    Ok(())
}

pub fn cmd_users_add(db: &Database, name: &str) -> Result<i64> {
    let id = db.create_user(name)?;
    println!("✅ Created user '{}' (ID: {})", name.trim(), id);
    Ok(id)
}
