use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Workstations::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Workstations::Id).integer().primary_key().not_null())
                    .col(ColumnDef::new(Workstations::Role).string().not_null())
                    .col(ColumnDef::new(Workstations::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Products::Id).big_integer().primary_key().not_null())
                    .col(ColumnDef::new(Products::Name).string().not_null())
                    .col(ColumnDef::new(Products::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Modules::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Modules::Id).big_integer().primary_key().not_null())
                    .col(ColumnDef::new(Modules::Name).string().not_null())
                    .col(ColumnDef::new(Modules::ProductionWorkstationId).integer().not_null())
                    .col(ColumnDef::new(Modules::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Parts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Parts::Id).big_integer().primary_key().not_null())
                    .col(ColumnDef::new(Parts::Name).string().not_null())
                    .col(ColumnDef::new(Parts::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BomEdges::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BomEdges::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(BomEdges::ParentType).string().not_null())
                    .col(ColumnDef::new(BomEdges::ParentId).big_integer().not_null())
                    .col(ColumnDef::new(BomEdges::ChildType).string().not_null())
                    .col(ColumnDef::new(BomEdges::ChildId).big_integer().not_null())
                    .col(ColumnDef::new(BomEdges::Quantity).integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bom_edges_parent")
                    .table(BomEdges::Table)
                    .col(BomEdges::ParentType)
                    .col(BomEdges::ParentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SystemConfiguration::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SystemConfiguration::Key).string().primary_key().not_null())
                    .col(ColumnDef::new(SystemConfiguration::Value).string().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(SystemConfiguration::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(BomEdges::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Parts::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Modules::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Products::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Workstations::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Workstations {
    Table,
    Id,
    Role,
    Name,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Modules {
    Table,
    Id,
    Name,
    ProductionWorkstationId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Parts {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum BomEdges {
    Table,
    Id,
    ParentType,
    ParentId,
    ChildType,
    ChildId,
    Quantity,
}

#[derive(DeriveIden)]
enum SystemConfiguration {
    Table,
    Key,
    Value,
}
