//! Runway CLI - Cashflow forecasting and decision simulation
//!
//! Usage:
//!   runway init                                  Initialize database
//!   runway users add alice                       Create a user
//!   runway import --file CSV --account 1         Import transactions
//!   runway simulate --user alice --type emi ...  Try a decision
//!   runway serve --port 3000                     Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let today = chrono::Local::now().date_naive();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Status => commands::cmd_status(&cli.db, cli.no_encrypt),
        Commands::Users { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(UsersAction::List) => commands::cmd_users_list(&db),
                Some(UsersAction::Add { name }) => commands::cmd_users_add(&db, &name).map(|_| ()),
            }
        }
        Commands::Accounts { user, action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(AccountsAction::List) => commands::cmd_accounts_list(&db, &user),
                Some(AccountsAction::Add { name, account_type }) => {
                    commands::cmd_accounts_add(&db, &user, &name, account_type.as_deref()).map(|_| ())
                }
                Some(AccountsAction::Balance { id, amount }) => {
                    commands::cmd_accounts_balance(&db, id, amount)
                }
            }
        }
        Commands::Import { file, account } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_import(&db, &file, account).map(|_| ())
        }
        Commands::Cashflow { user, json } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_cashflow(&db, &config, &user, json)
        }
        Commands::Forecast { user, days, json } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_forecast(&db, &config, &user, days, today, json)
        }
        Commands::Simulate {
            user,
            decision_type,
            amount,
            start,
            months,
            json,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let config = commands::load_config(cli.config.as_deref())?;
            let args = commands::SimulateArgs {
                user: &user,
                decision_type: &decision_type,
                amount,
                start,
                months,
            };
            commands::cmd_simulate(&db, &config, &args, today, json).map(|_| ())
        }
        Commands::Serve {
            port,
            host,
            no_auth,
        } => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_serve(&cli.db, &host, port, no_auth, cli.no_encrypt, config).await
        }
    }
}
