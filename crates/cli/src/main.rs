//! Mossberry CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run catalog database migrations
//! mossberry migrate catalog
//!
//! # Run identity database migrations
//! mossberry migrate identity
//!
//! # Run all database migrations
//! mossberry migrate all
//!
//! # Create an account
//! mossberry account create -u ada -e ada@example.com
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `account create` - Create accounts

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mossberry")]
#[command(author, version, about = "Mossberry CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Manage accounts
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Run catalog database migrations
    Catalog,
    /// Run identity database migrations
    Identity,
    /// Run all database migrations
    All,
}

#[derive(Subcommand)]
enum AccountAction {
    /// Create a new account
    Create {
        /// Username
        #[arg(short, long)]
        username: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Pre-computed password hash (omit for a passwordless account)
        #[arg(short, long)]
        password_hash: Option<String>,

        /// Role to add the account to (must already exist)
        #[arg(short, long)]
        role: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate { target } => match target {
            MigrateTarget::Catalog => commands::migrate::catalog().await?,
            MigrateTarget::Identity => commands::migrate::identity().await?,
            MigrateTarget::All => {
                commands::migrate::catalog().await?;
                commands::migrate::identity().await?;
            }
        },
        Commands::Account { action } => match action {
            AccountAction::Create {
                username,
                email,
                password_hash,
                role,
            } => {
                commands::account::create(&username, &email, password_hash, role.as_deref())
                    .await?;
            }
        },
    }
    Ok(())
}
