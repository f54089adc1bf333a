pub use sea_orm_migration::prelude::*;

mod m20240101_000001_master_data;
mod m20240101_000002_inventory_ledger;
mod m20240101_000003_customer_warehouse_orders;
mod m20240101_000004_production_orders;
mod m20240101_000005_users;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_master_data::Migration),
            Box::new(m20240101_000002_inventory_ledger::Migration),
            Box::new(m20240101_000003_customer_warehouse_orders::Migration),
            Box::new(m20240101_000004_production_orders::Migration),
            Box::new(m20240101_000005_users::Migration),
        ]
    }
}
