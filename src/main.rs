//! Bybit Listing Sniper - monitors new spot listings and scores them into
//! trading-strategy presets
//!
//! # WARNING
//! - The suggested parameters are heuristics over noisy public data.
//! - Most freshly listed tokens are extremely volatile; nothing here is
//!   financial advice.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use listing_sniper::cli::commands;
use listing_sniper::config::Config;

/// Bybit Listing Sniper - new-listing monitor and strategy scorer
#[derive(Parser)]
#[command(name = "listing-sniper")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Monitor announcements and analyze each new listing as it appears
    Monitor,

    /// Analyze one symbol on demand
    Analyze {
        /// Symbol, with or without the USDT suffix
        symbol: String,

        /// Skip persisting the result
        #[arg(long)]
        no_store: bool,
    },

    /// Analyze listings announced over the past days and print a summary
    History {
        /// Days to look back (defaults to the configured window)
        #[arg(long)]
        days: Option<i64>,
    },

    /// Show recently analyzed listings from the store
    Recent {
        /// Number of records to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Show current configuration (secrets masked)
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("listing_sniper=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Monitor => commands::monitor(&config).await,
        Commands::Analyze { symbol, no_store } => {
            commands::analyze(&config, &symbol, no_store).await
        }
        Commands::History { days } => {
            let days = days.unwrap_or(config.monitor.history_days);
            commands::history(&config, days).await
        }
        Commands::Recent { limit } => commands::recent(&config, limit).await,
        Commands::Config => commands::show_config(&config),
    }
}
