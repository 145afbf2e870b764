use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ImbalancePrices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ImbalancePrices::Time)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ImbalancePrices::AreaCode)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ImbalancePrices::PriceUp)
                            .decimal_len(10, 3)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ImbalancePrices::PriceDown)
                            .decimal_len(10, 3)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ImbalancePrices::Currency)
                            .char_len(3)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ImbalancePrices::Unit).string_len(10).null())
                    .col(ColumnDef::new(ImbalancePrices::Source).string().not_null())
                    // One price per interval, area, currency and provider
                    .primary_key(
                        Index::create()
                            .name("imbalance_prices_pkey")
                            .col(ImbalancePrices::Time)
                            .col(ImbalancePrices::AreaCode)
                            .col(ImbalancePrices::Currency)
                            .col(ImbalancePrices::Source),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_imbalance_currency")
                    .table(ImbalancePrices::Table)
                    .col(ImbalancePrices::Currency)
                    .to_owned(),
            )
            .await?;

        // Latest-record lookups per area
        manager
            .create_index(
                Index::create()
                    .name("idx_imbalance_area_time")
                    .table(ImbalancePrices::Table)
                    .col(ImbalancePrices::AreaCode)
                    .col(ImbalancePrices::Time)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_imbalance_time_desc")
                    .table(ImbalancePrices::Table)
                    .col((ImbalancePrices::Time, IndexOrder::Desc))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ImbalancePrices::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ImbalancePrices {
    Table,
    Time,
    AreaCode,
    PriceUp,
    PriceDown,
    Currency,
    Unit,
    Source,
}
