use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StockRecords::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(StockRecords::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(StockRecords::WorkstationId).integer().not_null())
                    .col(ColumnDef::new(StockRecords::ItemType).string().not_null())
                    .col(ColumnDef::new(StockRecords::ItemId).big_integer().not_null())
                    .col(ColumnDef::new(StockRecords::Quantity).big_integer().not_null())
                    .col(ColumnDef::new(StockRecords::LastUpdated).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_stock_records_key")
                    .table(StockRecords::Table)
                    .col(StockRecords::WorkstationId)
                    .col(StockRecords::ItemType)
                    .col(StockRecords::ItemId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StockLedgerEntries::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(StockLedgerEntries::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(StockLedgerEntries::Ts).timestamp().not_null())
                    .col(ColumnDef::new(StockLedgerEntries::WorkstationId).integer().not_null())
                    .col(ColumnDef::new(StockLedgerEntries::ItemType).string().not_null())
                    .col(ColumnDef::new(StockLedgerEntries::ItemId).big_integer().not_null())
                    .col(ColumnDef::new(StockLedgerEntries::Delta).big_integer().not_null())
                    .col(ColumnDef::new(StockLedgerEntries::Reason).string().not_null())
                    .col(ColumnDef::new(StockLedgerEntries::RefOrderType).string().null())
                    .col(ColumnDef::new(StockLedgerEntries::RefOrderId).uuid().null())
                    .col(ColumnDef::new(StockLedgerEntries::Actor).string().null())
                    .col(ColumnDef::new(StockLedgerEntries::IdempotencyKey).string().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ledger_idempotency_key")
                    .table(StockLedgerEntries::Table)
                    .col(StockLedgerEntries::IdempotencyKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ledger_key")
                    .table(StockLedgerEntries::Table)
                    .col(StockLedgerEntries::WorkstationId)
                    .col(StockLedgerEntries::ItemType)
                    .col(StockLedgerEntries::ItemId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(StockLedgerEntries::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(StockRecords::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum StockRecords {
    Table,
    Id,
    WorkstationId,
    ItemType,
    ItemId,
    Quantity,
    LastUpdated,
}

#[derive(DeriveIden)]
enum StockLedgerEntries {
    Table,
    Id,
    Ts,
    WorkstationId,
    ItemType,
    ItemId,
    Delta,
    Reason,
    RefOrderType,
    RefOrderId,
    Actor,
    IdempotencyKey,
}
