use sea_orm::{ColumnTrait, Database, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use sea_orm_migration::MigratorTrait;
use std::env;
use tokio::sync::Mutex;

use imbalance_prices_backend::entities::{imbalance_prices, prelude::*};

// Tests run in parallel; only the first one applies migrations
static MIGRATED: Mutex<bool> = Mutex::const_new(false);

/// Set up test database connection with the schema applied
/// Uses TEST_DATABASE_URL; returns None when it is not set so the caller can skip
pub async fn setup_test_db() -> Result<Option<DatabaseConnection>, DbErr> {
    let Ok(database_url) = env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping database test");
        return Ok(None);
    };

    let db = Database::connect(&database_url).await?;
    let mut migrated = MIGRATED.lock().await;
    if !*migrated {
        migration::Migrator::up(&db, None).await?;
        *migrated = true;
    }

    Ok(Some(db))
}

/// Remove every row written under a test-only source name
pub async fn cleanup_source(db: &DatabaseConnection, source: &str) -> Result<(), DbErr> {
    ImbalancePrices::delete_many()
        .filter(imbalance_prices::Column::Source.eq(source))
        .exec(db)
        .await?;
    Ok(())
}
