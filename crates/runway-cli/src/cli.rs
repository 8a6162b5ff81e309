//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Runway - See how far your money goes before you spend it
#[derive(Parser)]
#[command(name = "runway")]
#[command(about = "Cashflow forecasting and what-if decision simulation", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "runway.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set RUNWAY_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// Analysis configuration file (TOML)
    ///
    /// Defaults to the user override in the data directory if present,
    /// otherwise the built-in settings.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Show database status (encryption, size, counts)
    Status,

    /// Manage users
    Users {
        #[command(subcommand)]
        action: Option<UsersAction>,
    },

    /// Manage a user's accounts
    Accounts {
        /// User name or ID
        #[arg(short, long)]
        user: String,

        #[command(subcommand)]
        action: Option<AccountsAction>,
    },

    /// Import transactions from CSV (date, description, amount columns)
    Import {
        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,

        /// Account ID to import into
        #[arg(short, long)]
        account: i64,
    },

    /// Show monthly income, expense and net cashflow
    Cashflow {
        /// User name or ID
        #[arg(short, long)]
        user: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Forecast net cashflow
    Forecast {
        /// User name or ID
        #[arg(short, long)]
        user: String,

        /// Days ahead to forecast (rounded down to whole months, at least one)
        #[arg(short, long, default_value = "30")]
        days: u32,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Simulate a spending decision against the forecast
    Simulate {
        /// User name or ID
        #[arg(short, long)]
        user: String,

        /// Decision type: one_time, recurring, emi
        #[arg(short = 't', long = "type")]
        decision_type: String,

        /// Cost per occurrence
        #[arg(short, long)]
        amount: f64,

        /// First month the cost applies (YYYY-MM-DD)
        #[arg(short, long)]
        start: NaiveDate,

        /// Number of installments (EMI only)
        #[arg(short, long)]
        months: Option<u32>,

        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a network.
        /// By default, the server requires an API key from RUNWAY_API_KEYS.
        #[arg(long)]
        no_auth: bool,
    },
}

#[derive(Subcommand)]
pub enum UsersAction {
    /// List users
    List,
    /// Add a user
    Add {
        /// Unique user name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum AccountsAction {
    /// List the user's accounts
    List,
    /// Add an account (returns the existing one if the name is taken)
    Add {
        /// Account name
        name: String,

        /// Account type: checking, savings, credit, investment, loan
        #[arg(short = 't', long = "type")]
        account_type: Option<String>,
    },
    /// Record an account's current balance
    Balance {
        /// Account ID
        id: i64,

        /// Current balance
        #[arg(allow_negative_numbers = true)]
        amount: f64,
    },
}
