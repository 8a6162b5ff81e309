//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `accounts` - Account listing, creation and balances
//! - `analytics` - Cashflow summary, forecast and decision simulation
//! - `core` - Init and shared utilities (open_db, load_config, resolve_user)
//! - `import` - CSV import
//! - `serve` - Web server command
//! - `status` - Database status
//! - `users` - User management

pub mod accounts;
pub mod analytics;
pub mod core;
pub mod import;
pub mod serve;
pub mod status;
pub mod users;

// Re-export command functions for main.rs
pub use accounts::*;
pub use analytics::*;
pub use core::*;
pub use import::*;
pub use serve::*;
pub use status::*;
pub use users::*;

/// Format a signed amount with colour: red for negative, green otherwise
pub fn colored_amount(amount: f64) -> String {
    if amount < 0.0 {
        format!("\x1b[31m-${:.2}\x1b[0m", amount.abs())
    } else {
        format!("\x1b[32m${:.2}\x1b[0m", amount)
    }
}
