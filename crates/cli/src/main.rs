//! ShopEasy CLI - Database migrations, catalog seeding and admin accounts.
//!
//! # Usage
//!
//! ```bash
//! # Apply storefront database migrations
//! shopeasy migrate
//!
//! # Seed the catalog (skipped if products already exist)
//! shopeasy seed
//! shopeasy seed --file my-catalog.yaml
//!
//! # Create an admin account (password from SHOPEASY_ADMIN_PASSWORD)
//! shopeasy admin create -e admin@example.com -u admin
//!
//! # Promote an existing shopper
//! shopeasy admin promote -e shopper@example.com
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "shopeasy")]
#[command(author, version, about = "ShopEasy CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the product catalog
    Seed {
        /// YAML catalog file (defaults to the bundled catalog)
        #[arg(short, long)]
        file: Option<String>,
    },
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Register a new admin account
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin username
        #[arg(short, long)]
        username: String,
    },
    /// Grant admin rights to an existing account
    Promote {
        /// Email of the account to promote
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let pool = commands::connect().await?;

    match cli.command {
        Commands::Migrate => commands::migrate::run(&pool).await?,
        Commands::Seed { file } => commands::seed::catalog(&pool, file.as_deref()).await?,
        Commands::Admin { action } => match action {
            AdminAction::Create { email, username } => {
                commands::admin::create(&pool, &email, &username).await?;
            }
            AdminAction::Promote { email } => commands::admin::promote(&pool, &email).await?,
        },
    }
    Ok(())
}
