use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use imbalance_prices_backend::config::AppConfig;
use imbalance_prices_backend::jobs::imbalance_prices_sync::start_imbalance_prices_sync_job;
use imbalance_prices_backend::services::apg::ApgService;
use imbalance_prices_backend::services::imbalance_price_store::DbImbalancePriceStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,imbalance_prices_backend=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    // Connect to database
    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url).await?;

    // Run migrations
    tracing::info!("Running migrations...");
    migration::Migrator::up(&db, None).await?;

    let apg = ApgService::new(config.apg_base_url.clone());
    let store = DbImbalancePriceStore::new(db);

    tracing::info!(
        "Scheduling imbalance prices sync every {}s against {}",
        config.sync_interval_secs,
        apg.base_url()
    );
    start_imbalance_prices_sync_job(
        apg,
        store,
        config.initial_lookback_days,
        config.sync_interval_secs,
    )
    .await;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");

    Ok(())
}
