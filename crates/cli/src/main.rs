//! Clementine CLI - Catalog seeding and order management tools.
//!
//! # Usage
//!
//! ```bash
//! # Seed the catalog from a JSON file
//! clem-cli seed -f products.json
//!
//! # List all orders
//! clem-cli orders list
//!
//! # Move an order along its lifecycle
//! clem-cli orders set-status ord-123 processing
//! ```
//!
//! # Commands
//!
//! - `seed` - Create catalog products from a JSON file
//! - `orders list` - List every order
//! - `orders set-status` - Set an order's status (transition-validated)
//!
//! # Environment Variables
//!
//! - `BACKEND_BASE_URL` - Base URL of the document backend
//! - `BACKEND_ADMIN_API_KEY` - Privileged API key for the document backend

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "clem-cli")]
#[command(author, version, about = "Clementine CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the catalog from a JSON file
    Seed {
        /// Path to a JSON array of products
        #[arg(short, long)]
        file: String,
    },
    /// Manage orders
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
}

#[derive(Subcommand)]
enum OrderAction {
    /// List every order
    List,
    /// Set an order's status (`pending`, `processing`, `shipped`,
    /// `delivered`, `cancelled`)
    SetStatus {
        /// Order id
        id: String,
        /// Target status
        status: String,
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
        Commands::Seed { file } => commands::seed::catalog(&file).await?,
        Commands::Orders { action } => match action {
            OrderAction::List => commands::orders::list().await?,
            OrderAction::SetStatus { id, status } => {
                commands::orders::set_status(&id, &status).await?;
            }
        },
    }
    Ok(())
}
