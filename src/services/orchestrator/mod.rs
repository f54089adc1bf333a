//! §4.1 Order Orchestrator. Owns every order entity and drives the state
//! machines described in spec §3/§4.1, split by lifecycle stage to keep each
//! file focused the way `src/services/orders.rs` / `manufacturing.rs` are
//! split by concern in the teacher.

mod control_orders;
mod customer_orders;
mod final_assembly_orders;
mod production_orders;
mod supply_orders;
mod warehouse_orders;
mod workstation_orders;

pub use customer_orders::{CreateCustomerOrderRequest, CreateOrderItemRequest, CustomerOrderView};
pub use production_orders::ProductionOrderView;
pub use warehouse_orders::WarehouseOrderView;

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::sync::Arc;

use crate::entities::system_configuration;
use crate::errors::AppError;
use crate::events::EventSender;
use crate::services::bom_resolver::BomResolver;
use crate::services::inventory_ledger::InventoryLedgerService;
use crate::services::master_data::MasterDataService;
use crate::services::scheduler_adapter::SchedulerAdapter;

#[derive(Clone)]
pub struct OrderOrchestrator {
    pub(crate) db: Arc<DatabaseConnection>,
    pub(crate) inventory: InventoryLedgerService,
    pub(crate) master_data: MasterDataService,
    pub(crate) bom: BomResolver,
    pub(crate) scheduler: SchedulerAdapter,
    pub(crate) events: EventSender,
    pub(crate) lot_size_threshold_default: i32,
}

impl OrderOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        db: Arc<DatabaseConnection>,
        inventory: InventoryLedgerService,
        master_data: MasterDataService,
        bom: BomResolver,
        scheduler: SchedulerAdapter,
        events: EventSender,
        lot_size_threshold_default: i32,
    ) -> Self {
        Self { db, inventory, master_data, bom, scheduler, events, lot_size_threshold_default }
    }

    /// Reads the effective `LOT_SIZE_THRESHOLD`: the `system_configuration`
    /// row if present, else the configured default.
    pub(crate) async fn lot_size_threshold(&self) -> Result<i32, AppError> {
        let row = system_configuration::Entity::find_by_id(system_configuration::LOT_SIZE_THRESHOLD_KEY.to_string())
            .one(self.db.as_ref())
            .await?;
        match row {
            Some(r) => r.value.parse::<i32>().map_err(|_| {
                AppError::Internal(format!("LOT_SIZE_THRESHOLD value '{}' is not an integer", r.value))
            }),
            None => Ok(self.lot_size_threshold_default),
        }
    }

    /// Allocates the next `{prefix}-n` order number atomically, incrementing
    /// a per-prefix counter row in `system_configuration` inside the caller's
    /// transaction so the number and the order it labels commit together.
    pub(crate) async fn next_order_number<C>(txn: &C, prefix: &str) -> Result<String, AppError>
    where
        C: sea_orm::ConnectionTrait,
    {
        let key = system_configuration::sequence_key(prefix);
        let existing = system_configuration::Entity::find()
            .filter(system_configuration::Column::Key.eq(key.clone()))
            .one(txn)
            .await
            .map_err(AppError::database)?;

        let next = match existing {
            Some(row) => {
                let current: i64 = row.value.parse().unwrap_or(0);
                let next = current + 1;
                let mut am: system_configuration::ActiveModel = row.into();
                am.value = Set(next.to_string());
                am.update(txn).await.map_err(AppError::database)?;
                next
            }
            None => {
                let am = system_configuration::ActiveModel { key: Set(key), value: Set("1".to_string()) };
                am.insert(txn).await.map_err(AppError::database)?;
                1
            }
        };

        Ok(format!("{prefix}-{next}"))
    }
}
