//! Everwish CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! ew-cli migrate
//!
//! # Seed the catalog with starter experiences
//! ew-cli seed
//!
//! # Promote an existing user to admin
//! ew-cli admin promote -e ops@everwish.app
//!
//! # Reset a user's password
//! ew-cli admin set-password -e ops@everwish.app -p <new-password>
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed the catalog with starter data
//! - `admin promote` - Grant the admin role to a user
//! - `admin set-password` - Replace a user's password hash

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ew-cli")]
#[command(author, version, about = "Everwish CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the catalog with starter experiences
    Seed,
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Grant the admin role to an existing user
    Promote {
        /// User's email address
        #[arg(short, long)]
        email: String,
    },
    /// Replace a user's password
    SetPassword {
        /// User's email address
        #[arg(short, long)]
        email: String,

        /// New password
        #[arg(short, long)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ew_cli=info,everwish_api=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Migrate => commands::migrate::run().await,
        Commands::Seed => commands::seed::run().await,
        Commands::Admin { action } => match action {
            AdminAction::Promote { email } => commands::admin::promote(&email).await,
            AdminAction::SetPassword { email, password } => {
                commands::admin::set_password(&email, &password).await
            }
        },
    };

    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
