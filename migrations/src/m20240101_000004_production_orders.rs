use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProductionOrders::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ProductionOrders::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(ProductionOrders::Number).string().not_null())
                    .col(ColumnDef::new(ProductionOrders::SourceCustomerOrderId).uuid().null())
                    .col(ColumnDef::new(ProductionOrders::SourceWarehouseOrderId).uuid().null())
                    .col(ColumnDef::new(ProductionOrders::ScheduleId).string().null())
                    .col(ColumnDef::new(ProductionOrders::Status).string().not_null())
                    .col(ColumnDef::new(ProductionOrders::Priority).string().not_null())
                    .col(ColumnDef::new(ProductionOrders::Notes).text().null())
                    .col(ColumnDef::new(ProductionOrders::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(ProductionOrders::UpdatedAt).timestamp().not_null())
                    .col(ColumnDef::new(ProductionOrders::Version).integer().not_null())
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_production_orders_number")
                    .table(ProductionOrders::Table)
                    .col(ProductionOrders::Number)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ControlOrders::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ControlOrders::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(ControlOrders::Number).string().not_null())
                    .col(ColumnDef::new(ControlOrders::Kind).string().not_null())
                    .col(ColumnDef::new(ControlOrders::ProductionOrderId).uuid().not_null())
                    .col(ColumnDef::new(ControlOrders::AssignedWorkstationId).integer().not_null())
                    .col(ColumnDef::new(ControlOrders::ItemId).big_integer().not_null())
                    .col(ColumnDef::new(ControlOrders::Quantity).integer().not_null())
                    .col(ColumnDef::new(ControlOrders::Status).string().not_null())
                    .col(ColumnDef::new(ControlOrders::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(ControlOrders::UpdatedAt).timestamp().not_null())
                    .col(ColumnDef::new(ControlOrders::Version).integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SupplyOrders::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SupplyOrders::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(SupplyOrders::Number).string().not_null())
                    .col(ColumnDef::new(SupplyOrders::ControlOrderId).uuid().not_null())
                    .col(ColumnDef::new(SupplyOrders::RequestingWorkstationId).integer().not_null())
                    .col(ColumnDef::new(SupplyOrders::Status).string().not_null())
                    .col(ColumnDef::new(SupplyOrders::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(SupplyOrders::UpdatedAt).timestamp().not_null())
                    .col(ColumnDef::new(SupplyOrders::Version).integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SupplyOrderItems::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SupplyOrderItems::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(SupplyOrderItems::SupplyOrderId).uuid().not_null())
                    .col(ColumnDef::new(SupplyOrderItems::PartId).big_integer().not_null())
                    .col(ColumnDef::new(SupplyOrderItems::Quantity).integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WorkstationOrders::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(WorkstationOrders::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(WorkstationOrders::Number).string().not_null())
                    .col(ColumnDef::new(WorkstationOrders::ControlOrderId).uuid().not_null())
                    .col(ColumnDef::new(WorkstationOrders::Kind).string().not_null())
                    .col(ColumnDef::new(WorkstationOrders::WorkstationId).integer().not_null())
                    .col(ColumnDef::new(WorkstationOrders::ItemId).big_integer().not_null())
                    .col(ColumnDef::new(WorkstationOrders::Quantity).integer().not_null())
                    .col(ColumnDef::new(WorkstationOrders::SupplyOrderId).uuid().null())
                    .col(ColumnDef::new(WorkstationOrders::Status).string().not_null())
                    .col(ColumnDef::new(WorkstationOrders::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(WorkstationOrders::UpdatedAt).timestamp().not_null())
                    .col(ColumnDef::new(WorkstationOrders::Version).integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FinalAssemblyOrders::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(FinalAssemblyOrders::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(FinalAssemblyOrders::Number).string().not_null())
                    .col(ColumnDef::new(FinalAssemblyOrders::ParentType).string().not_null())
                    .col(ColumnDef::new(FinalAssemblyOrders::ParentId).uuid().not_null())
                    .col(ColumnDef::new(FinalAssemblyOrders::OutputProductId).big_integer().not_null())
                    .col(ColumnDef::new(FinalAssemblyOrders::OutputQuantity).integer().not_null())
                    .col(ColumnDef::new(FinalAssemblyOrders::SupplyOrderId).uuid().null())
                    .col(ColumnDef::new(FinalAssemblyOrders::Status).string().not_null())
                    .col(ColumnDef::new(FinalAssemblyOrders::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(FinalAssemblyOrders::UpdatedAt).timestamp().not_null())
                    .col(ColumnDef::new(FinalAssemblyOrders::Version).integer().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(FinalAssemblyOrders::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(WorkstationOrders::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(SupplyOrderItems::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(SupplyOrders::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(ControlOrders::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(ProductionOrders::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ProductionOrders {
    Table,
    Id,
    Number,
    SourceCustomerOrderId,
    SourceWarehouseOrderId,
    ScheduleId,
    Status,
    Priority,
    Notes,
    CreatedAt,
    UpdatedAt,
    Version,
}

#[derive(DeriveIden)]
enum ControlOrders {
    Table,
    Id,
    Number,
    Kind,
    ProductionOrderId,
    AssignedWorkstationId,
    ItemId,
    Quantity,
    Status,
    CreatedAt,
    UpdatedAt,
    Version,
}

#[derive(DeriveIden)]
enum SupplyOrders {
    Table,
    Id,
    Number,
    ControlOrderId,
    RequestingWorkstationId,
    Status,
    CreatedAt,
    UpdatedAt,
    Version,
}

#[derive(DeriveIden)]
enum SupplyOrderItems {
    Table,
    Id,
    SupplyOrderId,
    PartId,
    Quantity,
}

#[derive(DeriveIden)]
enum WorkstationOrders {
    Table,
    Id,
    Number,
    ControlOrderId,
    Kind,
    WorkstationId,
    ItemId,
    Quantity,
    SupplyOrderId,
    Status,
    CreatedAt,
    UpdatedAt,
    Version,
}

#[derive(DeriveIden)]
enum FinalAssemblyOrders {
    Table,
    Id,
    Number,
    ParentType,
    ParentId,
    OutputProductId,
    OutputQuantity,
    SupplyOrderId,
    Status,
    CreatedAt,
    UpdatedAt,
    Version,
}
