//! `SeaORM` Entity for imbalance_prices table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One settlement interval of imbalance prices.
///
/// `(time, area_code, currency, source)` is the primary key.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "imbalance_prices")]
pub struct Model {
    /// Start of the 15-minute settlement interval
    #[sea_orm(primary_key, auto_increment = false)]
    pub time: DateTimeWithTimeZone,
    /// EIC code of the control area (16 chars)
    #[sea_orm(primary_key, auto_increment = false)]
    pub area_code: String,
    #[sea_orm(column_type = "Decimal(Some((10, 3)))", nullable)]
    pub price_up: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((10, 3)))", nullable)]
    pub price_down: Option<Decimal>,
    #[sea_orm(primary_key, auto_increment = false)]
    pub currency: String,
    pub unit: Option<String>,
    #[sea_orm(primary_key, auto_increment = false)]
    pub source: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
