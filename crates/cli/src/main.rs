//! Kedai Kopi CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! kedai-cli migrate
//!
//! # Seed demo users and menu items
//! kedai-cli seed demo
//!
//! # Promote an existing user to admin
//! kedai-cli user promote <username>
//!
//! # Create a user
//! kedai-cli user create -u barista -p 'correct horse' -r admin
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "kedai-cli")]
#[command(author, version, about = "Kedai Kopi CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Demo accounts (admin/admin123, member/member123) and three menu items
    Demo,
}

#[derive(Subcommand)]
enum UserAction {
    /// Give an existing user the admin role
    Promote {
        /// Username to promote
        username: String,
    },
    /// Create a new user
    Create {
        /// Username
        #[arg(short, long)]
        username: String,

        /// Password (at least 8 characters)
        #[arg(short, long)]
        password: String,

        /// Email address
        #[arg(short, long)]
        email: Option<String>,

        /// Role (`admin`, `member`)
        #[arg(short, long, default_value = "member")]
        role: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Demo => commands::seed::demo().await?,
        },
        Commands::User { action } => match action {
            UserAction::Promote { username } => commands::user::promote(&username).await?,
            UserAction::Create {
                username,
                password,
                email,
                role,
            } => {
                commands::user::create(&username, &password, email.as_deref(), &role).await?;
            }
        },
    }
    Ok(())
}
