//! FX CLI
//!
//! Command-line interface for the exchange rate refresh API.

use anyhow::Result;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;

use fx_client::FxClient;
use fx_types::{CurrencyCode, PairId, RunState};

#[derive(Parser)]
#[command(name = "fx")]
#[command(author, version, about = "Exchange rate refresh API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the FX API
    #[arg(long, env = "FX_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API health and the state of the latest run
    Health,
    /// Show the cross rate between two currencies
    Rate {
        /// Currency converted from
        base: CurrencyCode,
        /// Currency converted to
        target: CurrencyCode,
    },
    /// Currency pair operations
    Pair {
        #[command(subcommand)]
        action: PairCommands,
    },
    /// Offset operations
    Offset {
        #[command(subcommand)]
        action: OffsetCommands,
    },
    /// Run a refresh now
    Refresh,
    /// Show the synchronization log
    SyncLog {
        /// Maximum number of entries
        #[arg(long, default_value_t = 50)]
        limit: i64,
    },
}

#[derive(Subcommand)]
enum PairCommands {
    /// List all pairs
    List,
    /// Add a pair (or change its active flag)
    Add {
        source: CurrencyCode,
        target: CurrencyCode,
        /// Exclude the pair from refresh runs
        #[arg(long)]
        inactive: bool,
    },
}

#[derive(Subcommand)]
enum OffsetCommands {
    /// List offsets of all active pairs
    List,
    /// Show the offset of a pair
    Get {
        /// Pair id, e.g. USD->EUR
        pair: PairId,
    },
    /// Overwrite the offset of a pair
    Set {
        /// Pair id, e.g. USD->EUR
        pair: PairId,
        /// Additive adjustment, e.g. 0.01 or -0.005
        #[arg(allow_negative_numbers = true)]
        offset: Decimal,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = FxClient::new(&cli.api_url);

    match cli.command {
        Commands::Health => {
            let health = client.health().await?;
            println!("✓ API is {} (last run: {})", health.status, health.last_run);
        }

        Commands::Rate { base, target } => {
            let rate = client.cross_rate(&base, &target).await?;
            println!("1 {} = {} {}", rate.base, rate.rate, rate.target);
        }

        Commands::Pair { action } => match action {
            PairCommands::List => print_json(&client.list_pairs().await?)?,
            PairCommands::Add {
                source,
                target,
                inactive,
            } => print_json(&client.create_pair(source, target, !inactive).await?)?,
        },

        Commands::Offset { action } => match action {
            OffsetCommands::List => print_json(&client.offset_configuration().await?)?,
            OffsetCommands::Get { pair } => print_json(&client.get_offset(&pair).await?)?,
            OffsetCommands::Set { pair, offset } => {
                print_json(&client.set_offset(&pair, offset).await?)?
            }
        },

        Commands::Refresh => {
            let report = client.refresh().await?;
            print_json(&report)?;
            if report.state != RunState::Committed {
                std::process::exit(1);
            }
        }

        Commands::SyncLog { limit } => print_json(&client.sync_log(limit).await?)?,
    }

    Ok(())
}
