//! Fetch APG imbalance prices into `imbalance_prices`.
//!
//! Usage: cargo run --bin fetch_apg_imbalance_prices -- [--days <N>]

use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use sea_orm::Database;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use imbalance_prices_backend::config::AppConfig;
use imbalance_prices_backend::jobs::imbalance_prices_sync::ImbalancePriceSync;
use imbalance_prices_backend::services::apg::{ApgService, IngestSettings};
use imbalance_prices_backend::services::imbalance_price_store::DbImbalancePriceStore;

#[derive(Parser)]
#[command(name = "fetch_apg_imbalance_prices")]
#[command(about = "Fetches imbalance price data from the APG API and upserts it into imbalance_prices")]
struct Cli {
    /// Number of days back to fetch (used only when the table is empty for this area)
    #[arg(long)]
    days: Option<u32>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = AppConfig::from_env()?;

    let db = Database::connect(&config.database_url).await?;
    let apg = ApgService::new(config.apg_base_url);
    let store = DbImbalancePriceStore::new(db);

    let sync = ImbalancePriceSync::new(&apg, &store, IngestSettings::default());
    let summary = sync.run(cli.days, Utc::now()).await?;

    for failed in &summary.failed_days {
        tracing::warn!("Day {} was not imported: {}", failed.day, failed.error);
    }

    Ok(())
}
