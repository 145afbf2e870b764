//! Persistence of imbalance prices

use async_trait::async_trait;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, Order, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entities::{imbalance_prices, prelude::*};

/// Read/write access to persisted imbalance prices.
#[async_trait]
pub trait ImbalancePriceStore: Send + Sync {
    /// Newest `time` stored for the area and source
    async fn latest_time(
        &self,
        area_code: &str,
        source: &str,
    ) -> Result<Option<DateTimeWithTimeZone>, DbErr>;

    /// Insert or overwrite records on `(time, area_code, currency, source)`.
    ///
    /// Only `price_up`, `price_down` and `unit` are replaced on conflict.
    /// Returns the number of rows written.
    async fn upsert(&self, records: Vec<imbalance_prices::Model>) -> Result<u64, DbErr>;
}

#[derive(Clone)]
pub struct DbImbalancePriceStore {
    db: DatabaseConnection,
}

impl DbImbalancePriceStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ImbalancePriceStore for DbImbalancePriceStore {
    async fn latest_time(
        &self,
        area_code: &str,
        source: &str,
    ) -> Result<Option<DateTimeWithTimeZone>, DbErr> {
        let last_record = ImbalancePrices::find()
            .filter(imbalance_prices::Column::AreaCode.eq(area_code))
            .filter(imbalance_prices::Column::Source.eq(source))
            .order_by(imbalance_prices::Column::Time, Order::Desc)
            .limit(1)
            .one(&self.db)
            .await?;

        Ok(last_record.map(|record| record.time))
    }

    async fn upsert(&self, records: Vec<imbalance_prices::Model>) -> Result<u64, DbErr> {
        if records.is_empty() {
            return Ok(0);
        }

        let models = records.into_iter().map(|record| imbalance_prices::ActiveModel {
            time: Set(record.time),
            area_code: Set(record.area_code),
            price_up: Set(record.price_up),
            price_down: Set(record.price_down),
            currency: Set(record.currency),
            unit: Set(record.unit),
            source: Set(record.source),
        });

        ImbalancePrices::insert_many(models)
            .on_conflict(
                OnConflict::columns([
                    imbalance_prices::Column::Time,
                    imbalance_prices::Column::AreaCode,
                    imbalance_prices::Column::Currency,
                    imbalance_prices::Column::Source,
                ])
                .update_columns([
                    imbalance_prices::Column::PriceUp,
                    imbalance_prices::Column::PriceDown,
                    imbalance_prices::Column::Unit,
                ])
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
    }
}
