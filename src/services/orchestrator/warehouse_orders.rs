use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::entities::enums::{AdjustReason, ItemType, WarehouseOrderScenario, WarehouseOrderStatus};
use crate::entities::{customer_order, warehouse_order, warehouse_order_item};
use crate::errors::AppError;
use crate::events::Event;
use crate::services::scenario_selector::{select_warehouse_order_scenario, StockAvailability};

use super::customer_orders::CustomerOrderView;
use super::OrderOrchestrator;

const WAREHOUSE_ORDER_PREFIX: &str = "WO";
const MODULES_SUPERMARKET: i32 = 8;

#[derive(Debug, Serialize)]
pub struct WarehouseOrderView {
    pub id: Uuid,
    pub number: String,
    pub status: WarehouseOrderStatus,
    pub trigger_scenario: Option<WarehouseOrderScenario>,
    pub production_order_id: Option<Uuid>,
    pub items: Vec<warehouse_order_item::Model>,
}

impl OrderOrchestrator {
    /// §4.1 `fulfillCustomerOrder`'s `WAREHOUSE_ORDER_NEEDED` path: expands
    /// every CO item's product to its module requirements via the BOM
    /// resolver and opens a WarehouseOrder with the summed quantities.
    pub(crate) async fn fulfill_via_warehouse_order(&self, order: customer_order::Model) -> Result<CustomerOrderView, AppError> {
        let items = sea_orm::EntityTrait::find(crate::entities::customer_order_item::Entity)
            .filter(crate::entities::customer_order_item::Column::CustomerOrderId.eq(order.id))
            .all(self.db.as_ref())
            .await
            .map_err(AppError::database)?;

        let mut module_totals: HashMap<i64, i64> = HashMap::new();
        for item in &items {
            let expanded = self.bom.expand(ItemType::Product, item.product_id, item.quantity as i64).await?;
            for ((item_type, item_id), qty) in expanded {
                if item_type == ItemType::Module {
                    *module_totals.entry(item_id).or_insert(0) += qty;
                }
            }
        }

        let txn = self.db.begin().await.map_err(AppError::database)?;
        let now = Utc::now();
        let number = Self::next_order_number(&txn, WAREHOUSE_ORDER_PREFIX).await?;
        let wo_id = Uuid::new_v4();

        let wo = warehouse_order::ActiveModel {
            id: Set(wo_id),
            number: Set(number.clone()),
            customer_order_id: Set(Some(order.id)),
            production_order_id: Set(None),
            status: Set(WarehouseOrderStatus::Pending),
            priority: Set(order.priority),
            trigger_scenario: Set(None),
            notes: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            version: Set(0),
        };
        wo.insert(&txn).await.map_err(AppError::database)?;

        let mut wo_items = Vec::with_capacity(module_totals.len());
        for (module_id, quantity) in &module_totals {
            let am = warehouse_order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                warehouse_order_id: Set(wo_id),
                module_id: Set(*module_id),
                quantity: Set(*quantity as i32),
            };
            wo_items.push(am.insert(&txn).await.map_err(AppError::database)?);
        }

        let mut co_am: customer_order::ActiveModel = order.clone().into();
        co_am.status = Set(crate::entities::enums::CustomerOrderStatus::Processing);
        co_am.updated_at = Set(now);
        co_am.version = Set(order.version + 1);
        let co_updated = co_am.update(&txn).await.map_err(AppError::database)?;

        txn.commit().await.map_err(AppError::database)?;

        let _ = self.events.send(Event::WarehouseOrderCreated(wo_id)).await;
        let _ = self
            .events
            .send(Event::CustomerOrderStatusChanged {
                order_id: order.id,
                old_status: "CONFIRMED".to_string(),
                new_status: "PROCESSING".to_string(),
            })
            .await;

        Ok(CustomerOrderView {
            id: co_updated.id,
            number: co_updated.number,
            status: co_updated.status,
            priority: co_updated.priority,
            trigger_scenario: co_updated.trigger_scenario,
            items,
        })
    }

    async fn get_warehouse_order(&self, id: Uuid) -> Result<warehouse_order::Model, AppError> {
        warehouse_order::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| AppError::OrderNotFound(format!("warehouse order {id} not found")))
    }

    async fn get_warehouse_order_items(&self, id: Uuid) -> Result<Vec<warehouse_order_item::Model>, AppError> {
        warehouse_order_item::Entity::find()
            .filter(warehouse_order_item::Column::WarehouseOrderId.eq(id))
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from)
    }

    /// §4.1 `confirmWarehouseOrder`.
    #[tracing::instrument(skip(self))]
    pub async fn confirm_warehouse_order(&self, id: Uuid) -> Result<WarehouseOrderView, AppError> {
        let order = self.get_warehouse_order(id).await?;
        if order.status != WarehouseOrderStatus::Pending {
            return Err(AppError::OrderInvalidState(format!("warehouse order {id} is {:?}, expected PENDING", order.status)));
        }

        let items = self.get_warehouse_order_items(id).await?;
        let mut availabilities = Vec::with_capacity(items.len());
        for item in &items {
            let available = self.inventory.available(MODULES_SUPERMARKET, ItemType::Module, item.module_id).await?;
            availabilities.push(StockAvailability { requested: item.quantity as i64, available });
        }
        let scenario = select_warehouse_order_scenario(&availabilities);

        let now = Utc::now();
        let mut am: warehouse_order::ActiveModel = order.clone().into();
        am.status = Set(WarehouseOrderStatus::Confirmed);
        am.trigger_scenario = Set(Some(scenario));
        am.updated_at = Set(now);
        am.version = Set(order.version + 1);
        let updated = am.update(self.db.as_ref()).await.map_err(AppError::database)?;

        let _ = self
            .events
            .send(Event::WarehouseOrderStatusChanged {
                order_id: id,
                old_status: "PENDING".to_string(),
                new_status: "CONFIRMED".to_string(),
            })
            .await;

        Ok(WarehouseOrderView {
            id: updated.id,
            number: updated.number,
            status: updated.status,
            trigger_scenario: updated.trigger_scenario,
            production_order_id: updated.production_order_id,
            items,
        })
    }

    /// §4.1 `fulfillWarehouseOrder`.
    #[tracing::instrument(skip(self))]
    pub async fn fulfill_warehouse_order(&self, id: Uuid) -> Result<WarehouseOrderView, AppError> {
        let order = self.get_warehouse_order(id).await?;
        if order.status != WarehouseOrderStatus::Confirmed && order.status != WarehouseOrderStatus::Processing {
            return Err(AppError::OrderInvalidState(format!(
                "warehouse order {id} is {:?}, expected CONFIRMED or PROCESSING",
                order.status
            )));
        }

        let items = self.get_warehouse_order_items(id).await?;

        if order.production_order_id.is_none() {
            // Not reserved by a production campaign: must have selected DIRECT_FULFILLMENT.
            if order.trigger_scenario != Some(WarehouseOrderScenario::DirectFulfillment) {
                return Err(AppError::OrderInvalidOperation(format!(
                    "warehouse order {id} cannot fulfill directly: scenario is {:?}",
                    order.trigger_scenario
                )));
            }
        }
        // When `production_order_id` is set, modules were reserved by the production
        // campaign: stock checks are bypassed per invariant 5 — we debit unconditionally.
        for item in &items {
            self.inventory
                .adjust(
                    MODULES_SUPERMARKET,
                    ItemType::Module,
                    item.module_id,
                    -(item.quantity as i64),
                    AdjustReason::Fulfillment,
                    Some("WarehouseOrder".to_string()),
                    Some(id),
                    None,
                    Some(format!("WarehouseOrder:{id}:fulfill:{}", item.module_id)),
                )
                .await?;
        }

        self.create_final_assembly_orders_for_warehouse_order(&order).await?;

        let now = Utc::now();
        let mut am: warehouse_order::ActiveModel = order.clone().into();
        am.status = Set(WarehouseOrderStatus::Fulfilled);
        am.updated_at = Set(now);
        am.version = Set(order.version + 1);
        let updated = am.update(self.db.as_ref()).await.map_err(AppError::database)?;

        let _ = self
            .events
            .send(Event::WarehouseOrderStatusChanged {
                order_id: id,
                old_status: format!("{:?}", order.status),
                new_status: "FULFILLED".to_string(),
            })
            .await;

        Ok(WarehouseOrderView {
            id: updated.id,
            number: updated.number,
            status: updated.status,
            trigger_scenario: updated.trigger_scenario,
            production_order_id: updated.production_order_id,
            items,
        })
    }

    /// §4.1 `orderProductionFromWarehouse`.
    #[tracing::instrument(skip(self))]
    pub async fn order_production_from_warehouse(&self, id: Uuid) -> Result<Uuid, AppError> {
        let order = self.get_warehouse_order(id).await?;
        if order.trigger_scenario != Some(WarehouseOrderScenario::ProductionRequired) {
            return Err(AppError::OrderInvalidOperation(format!(
                "warehouse order {id} did not select PRODUCTION_REQUIRED"
            )));
        }
        if order.production_order_id.is_some() {
            return Err(AppError::OrderInvalidState(format!("warehouse order {id} already has a production order")));
        }

        let po_id = self.create_production_order(None, Some(id), order.priority).await?;

        let now = Utc::now();
        let mut am: warehouse_order::ActiveModel = order.clone().into();
        am.production_order_id = Set(Some(po_id));
        am.updated_at = Set(now);
        am.version = Set(order.version + 1);
        am.update(self.db.as_ref()).await.map_err(AppError::database)?;

        Ok(po_id)
    }

    /// Re-evaluates a WarehouseOrder for completion once all its
    /// FinalAssemblyOrders have been submitted (auto-completion rule, §4.1).
    ///
    /// `fulfill_warehouse_order` already moves the WO to FULFILLED at
    /// FA-creation time, before any FA has actually submitted, so the
    /// FA-driven completion check below cannot be gated on WO status: it has
    /// to run independently of it every time a sibling FA submits.
    /// `complete_customer_order` is itself idempotent (no-ops once the CO is
    /// no longer PROCESSING), so calling it once per completed sibling FA is
    /// safe.
    pub(crate) async fn maybe_complete_warehouse_order(&self, id: Uuid) -> Result<(), AppError> {
        let order = self.get_warehouse_order(id).await?;

        let all_fas_completed = self.all_final_assembly_orders_completed_for_warehouse_order(id).await?;
        if !all_fas_completed {
            return Ok(());
        }

        if order.status != WarehouseOrderStatus::Fulfilled {
            let now = Utc::now();
            let mut am: warehouse_order::ActiveModel = order.clone().into();
            am.status = Set(WarehouseOrderStatus::Fulfilled);
            am.updated_at = Set(now);
            am.version = Set(order.version + 1);
            am.update(self.db.as_ref()).await.map_err(AppError::database)?;

            let _ = self
                .events
                .send(Event::WarehouseOrderStatusChanged {
                    order_id: id,
                    old_status: format!("{:?}", order.status),
                    new_status: "FULFILLED".to_string(),
                })
                .await;
        }

        if let Some(co_id) = order.customer_order_id {
            self.complete_customer_order(co_id).await?;
        }
        Ok(())
    }
}
