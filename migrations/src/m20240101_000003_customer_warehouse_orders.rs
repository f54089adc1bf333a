use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CustomerOrders::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(CustomerOrders::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(CustomerOrders::Number).string().not_null())
                    .col(ColumnDef::new(CustomerOrders::Status).string().not_null())
                    .col(ColumnDef::new(CustomerOrders::Priority).string().not_null())
                    .col(ColumnDef::new(CustomerOrders::TriggerScenario).string().null())
                    .col(ColumnDef::new(CustomerOrders::Notes).text().null())
                    .col(ColumnDef::new(CustomerOrders::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(CustomerOrders::UpdatedAt).timestamp().not_null())
                    .col(ColumnDef::new(CustomerOrders::Version).integer().not_null())
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_customer_orders_number")
                    .table(CustomerOrders::Table)
                    .col(CustomerOrders::Number)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CustomerOrderItems::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(CustomerOrderItems::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(CustomerOrderItems::CustomerOrderId).uuid().not_null())
                    .col(ColumnDef::new(CustomerOrderItems::ProductId).big_integer().not_null())
                    .col(ColumnDef::new(CustomerOrderItems::Quantity).integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WarehouseOrders::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(WarehouseOrders::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(WarehouseOrders::Number).string().not_null())
                    .col(ColumnDef::new(WarehouseOrders::CustomerOrderId).uuid().not_null())
                    .col(ColumnDef::new(WarehouseOrders::ProductionOrderId).uuid().null())
                    .col(ColumnDef::new(WarehouseOrders::Status).string().not_null())
                    .col(ColumnDef::new(WarehouseOrders::Priority).string().not_null())
                    .col(ColumnDef::new(WarehouseOrders::TriggerScenario).string().null())
                    .col(ColumnDef::new(WarehouseOrders::Notes).text().null())
                    .col(ColumnDef::new(WarehouseOrders::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(WarehouseOrders::UpdatedAt).timestamp().not_null())
                    .col(ColumnDef::new(WarehouseOrders::Version).integer().not_null())
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_warehouse_orders_number")
                    .table(WarehouseOrders::Table)
                    .col(WarehouseOrders::Number)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WarehouseOrderItems::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(WarehouseOrderItems::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(WarehouseOrderItems::WarehouseOrderId).uuid().not_null())
                    .col(ColumnDef::new(WarehouseOrderItems::ModuleId).big_integer().not_null())
                    .col(ColumnDef::new(WarehouseOrderItems::Quantity).integer().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(WarehouseOrderItems::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(WarehouseOrders::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(CustomerOrderItems::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(CustomerOrders::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum CustomerOrders {
    Table,
    Id,
    Number,
    Status,
    Priority,
    TriggerScenario,
    Notes,
    CreatedAt,
    UpdatedAt,
    Version,
}

#[derive(DeriveIden)]
enum CustomerOrderItems {
    Table,
    Id,
    CustomerOrderId,
    ProductId,
    Quantity,
}

#[derive(DeriveIden)]
enum WarehouseOrders {
    Table,
    Id,
    Number,
    CustomerOrderId,
    ProductionOrderId,
    Status,
    Priority,
    TriggerScenario,
    Notes,
    CreatedAt,
    UpdatedAt,
    Version,
}

#[derive(DeriveIden)]
enum WarehouseOrderItems {
    Table,
    Id,
    WarehouseOrderId,
    ModuleId,
    Quantity,
}
