//! Storefront Cart CLI - drive the persisted cart from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! cart-cli show
//!
//! # Add one unit of product 3
//! cart-cli add 3
//!
//! # Set product 3 to 2 units
//! cart-cli update 3 2
//!
//! # Remove product 3, or everything
//! cart-cli remove 3
//! cart-cli clear
//! ```
//!
//! Uses the same `CATALOG_API_URL`, `CART_STORAGE_PATH` and
//! `CART_STORAGE_KEY` settings as the server. The server reads the cart file
//! only at startup and overwrites it on its next change, so run the CLI
//! against the file while the server is stopped.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use storefront_cart_core::ProductId;

mod commands;

#[derive(Parser)]
#[command(name = "cart-cli")]
#[command(author, version, about = "Storefront cart CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cart
    Show,
    /// Add one unit of a product
    Add {
        /// Catalog product ID
        product_id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Catalog product ID
        product_id: ProductId,
    },
    /// Set the quantity of a product already in the cart
    Update {
        /// Catalog product ID
        product_id: ProductId,

        /// New quantity (at least 1)
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
    /// Remove every product
    Clear,
}

#[tokio::main]
async fn main() {
    // Initialize tracing; stdout is reserved for the cart itself
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    let service = commands::load_service().await?;

    match cli.command {
        Commands::Show => commands::show(&service).await,
        Commands::Add { product_id } => commands::add(&service, product_id).await,
        Commands::Remove { product_id } => commands::remove(&service, product_id).await,
        Commands::Update { product_id, amount } => {
            commands::update(&service, product_id, amount).await
        }
        Commands::Clear => commands::clear(&service).await,
    }
}
