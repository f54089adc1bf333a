use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::entities::enums::{ControlOrderKind, ControlOrderStatus, ItemType, Priority, ProductionOrderStatus};
use crate::entities::{control_order, customer_order, customer_order_item, production_order, warehouse_order, warehouse_order_item};
use crate::errors::AppError;
use crate::events::Event;
use crate::services::scheduler_adapter::{ScheduleLineItem, ScheduleRequest};

use super::customer_orders::CustomerOrderView;
use super::OrderOrchestrator;

const PRODUCTION_ORDER_PREFIX: &str = "PO";
const PCO_PREFIX: &str = "PCO";
const ACO_PREFIX: &str = "ACO";

/// Placeholder estimate fed to the scheduler per unit; the scheduler owns
/// the real timing model, this crate only needs a number to send.
const MINUTES_PER_UNIT: i32 = 15;

#[derive(Debug, Serialize)]
pub struct ProductionOrderView {
    pub id: Uuid,
    pub number: String,
    pub status: ProductionOrderStatus,
    pub schedule_id: Option<String>,
    pub source_customer_order_id: Option<Uuid>,
    pub source_warehouse_order_id: Option<Uuid>,
}

impl OrderOrchestrator {
    async fn get_production_order(&self, id: Uuid) -> Result<production_order::Model, AppError> {
        production_order::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| AppError::OrderNotFound(format!("production order {id} not found")))
    }

    /// Creates a PENDING ProductionOrder from exactly one source, per
    /// invariant 4. Scheduling is a separate step (`schedule_production`).
    pub(crate) async fn create_production_order(
        &self,
        source_customer_order_id: Option<Uuid>,
        source_warehouse_order_id: Option<Uuid>,
        priority: Priority,
    ) -> Result<Uuid, AppError> {
        let txn = self.db.begin().await.map_err(AppError::database)?;
        let now = Utc::now();
        let number = Self::next_order_number(&txn, PRODUCTION_ORDER_PREFIX).await?;
        let id = Uuid::new_v4();

        let po = production_order::ActiveModel {
            id: Set(id),
            number: Set(number),
            source_customer_order_id: Set(source_customer_order_id),
            source_warehouse_order_id: Set(source_warehouse_order_id),
            schedule_id: Set(None),
            status: Set(ProductionOrderStatus::Pending),
            priority: Set(priority),
            notes: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            version: Set(0),
        };
        po.insert(&txn).await.map_err(AppError::database)?;
        txn.commit().await.map_err(AppError::database)?;

        let _ = self.events.send(Event::ProductionOrderCreated(id)).await;
        Ok(id)
    }

    /// §4.1 `fulfillCustomerOrder`'s `DIRECT_PRODUCTION` path.
    pub(crate) async fn fulfill_via_direct_production(&self, order: customer_order::Model) -> Result<CustomerOrderView, AppError> {
        let po_id = self.create_production_order(Some(order.id), None, order.priority).await?;
        self.mark_processing(&order).await?;
        self.schedule_production(po_id).await?;

        let items = customer_order_item::Entity::find()
            .filter(customer_order_item::Column::CustomerOrderId.eq(order.id))
            .all(self.db.as_ref())
            .await
            .map_err(AppError::database)?;

        Ok(CustomerOrderView {
            id: order.id,
            number: order.number,
            status: crate::entities::enums::CustomerOrderStatus::Processing,
            priority: order.priority,
            trigger_scenario: order.trigger_scenario,
            items,
        })
    }

    /// Builds the module multiset this PO must produce, depending on its source.
    async fn required_modules(&self, po: &production_order::Model) -> Result<HashMap<i64, i64>, AppError> {
        let mut totals: HashMap<i64, i64> = HashMap::new();

        if let Some(co_id) = po.source_customer_order_id {
            let items = customer_order_item::Entity::find()
                .filter(customer_order_item::Column::CustomerOrderId.eq(co_id))
                .all(self.db.as_ref())
                .await
                .map_err(AppError::database)?;
            for item in items {
                let expanded = self.bom.expand(ItemType::Product, item.product_id, item.quantity as i64).await?;
                for ((item_type, item_id), qty) in expanded {
                    if item_type == ItemType::Module {
                        *totals.entry(item_id).or_insert(0) += qty;
                    }
                }
            }
        } else if let Some(wo_id) = po.source_warehouse_order_id {
            let items = warehouse_order_item::Entity::find()
                .filter(warehouse_order_item::Column::WarehouseOrderId.eq(wo_id))
                .all(self.db.as_ref())
                .await
                .map_err(AppError::database)?;
            for item in items {
                *totals.entry(item.module_id).or_insert(0) += item.quantity as i64;
            }
        }

        Ok(totals)
    }

    /// §4.1 `scheduleProduction`.
    #[tracing::instrument(skip(self))]
    pub async fn schedule_production(&self, po_id: Uuid) -> Result<ProductionOrderView, AppError> {
        let po = self.get_production_order(po_id).await?;
        if po.status != ProductionOrderStatus::Pending {
            return Err(AppError::OrderInvalidState(format!("production order {po_id} is {:?}, expected PENDING", po.status)));
        }

        let modules = self.required_modules(&po).await?;
        let mut line_items = Vec::with_capacity(modules.len());
        for (module_id, quantity) in &modules {
            let module = self.master_data.get_module(*module_id).await?;
            line_items.push(ScheduleLineItem {
                item_id: module.id,
                item_name: module.name,
                quantity: *quantity as i32,
                estimated_time_minutes: *quantity as i32 * MINUTES_PER_UNIT,
            });
        }

        let request = ScheduleRequest {
            order_number: po.number.clone(),
            priority: po.priority,
            due_date: None,
            line_items,
        };
        let schedule = self.scheduler.schedule_production(&request).await?;

        let txn = self.db.begin().await.map_err(AppError::database)?;
        for task in &schedule.tasks {
            let module = self.master_data.get_module(task.item_id).await?;
            let kind = if module.is_manufacturing_produced() { ControlOrderKind::ProductionControl } else { ControlOrderKind::AssemblyControl };
            let prefix = if kind == ControlOrderKind::ProductionControl { PCO_PREFIX } else { ACO_PREFIX };
            let number = Self::next_order_number(&txn, prefix).await?;
            let now = Utc::now();

            let co = control_order::ActiveModel {
                id: Set(Uuid::new_v4()),
                number: Set(number),
                kind: Set(kind),
                production_order_id: Set(po_id),
                assigned_workstation_id: Set(task.workstation_id),
                item_id: Set(task.item_id),
                quantity: Set(task.quantity),
                status: Set(ControlOrderStatus::Pending),
                created_at: Set(now),
                updated_at: Set(now),
                version: Set(0),
            };
            co.insert(&txn).await.map_err(AppError::database)?;
        }

        let mut am: production_order::ActiveModel = po.clone().into();
        am.schedule_id = Set(Some(schedule.schedule_id.clone()));
        am.status = Set(ProductionOrderStatus::Scheduled);
        am.updated_at = Set(Utc::now());
        am.version = Set(po.version + 1);
        let updated = am.update(&txn).await.map_err(AppError::database)?;
        txn.commit().await.map_err(AppError::database)?;

        let _ = self
            .events
            .send(Event::ProductionOrderStatusChanged {
                order_id: po_id,
                old_status: "PENDING".to_string(),
                new_status: "SCHEDULED".to_string(),
            })
            .await;

        Ok(ProductionOrderView {
            id: updated.id,
            number: updated.number,
            status: updated.status,
            schedule_id: updated.schedule_id,
            source_customer_order_id: updated.source_customer_order_id,
            source_warehouse_order_id: updated.source_warehouse_order_id,
        })
    }

    /// Auto-completion rule (§4.1): a ProductionOrder completes once every
    /// child control order is COMPLETED, then propagates to its source order.
    pub(crate) async fn maybe_complete_production_order(&self, po_id: Uuid) -> Result<(), AppError> {
        let po = self.get_production_order(po_id).await?;
        if po.status == ProductionOrderStatus::Completed {
            return Ok(());
        }

        let control_orders = control_order::Entity::find()
            .filter(control_order::Column::ProductionOrderId.eq(po_id))
            .all(self.db.as_ref())
            .await
            .map_err(AppError::database)?;
        if control_orders.is_empty() || !control_orders.iter().all(|c| c.status == ControlOrderStatus::Completed) {
            return Ok(());
        }

        // A WO-sourced PO has no final assembly of its own (its reserved
        // WarehouseOrder creates the FAs); it completes the moment control
        // orders do. A CO-sourced PO (Scenario 4) instead moves to IN_PROGRESS
        // here and only reaches COMPLETED once its own FAs are submitted.
        if let Some(wo_id) = po.source_warehouse_order_id {
            let now = Utc::now();
            let mut am: production_order::ActiveModel = po.clone().into();
            am.status = Set(ProductionOrderStatus::Completed);
            am.updated_at = Set(now);
            am.version = Set(po.version + 1);
            am.update(self.db.as_ref()).await.map_err(AppError::database)?;

            let _ = self
                .events
                .send(Event::ProductionOrderStatusChanged {
                    order_id: po_id,
                    old_status: format!("{:?}", po.status),
                    new_status: "COMPLETED".to_string(),
                })
                .await;

            let wo = warehouse_order::Entity::find_by_id(wo_id)
                .one(self.db.as_ref())
                .await
                .map_err(AppError::database)?;
            if let Some(wo) = wo {
                if wo.status == crate::entities::enums::WarehouseOrderStatus::Confirmed {
                    self.fulfill_warehouse_order(wo_id).await?;
                }
            }
        } else if po.status != ProductionOrderStatus::InProgress {
            let now = Utc::now();
            let mut am: production_order::ActiveModel = po.clone().into();
            am.status = Set(ProductionOrderStatus::InProgress);
            am.updated_at = Set(now);
            am.version = Set(po.version + 1);
            am.update(self.db.as_ref()).await.map_err(AppError::database)?;

            let _ = self
                .events
                .send(Event::ProductionOrderStatusChanged {
                    order_id: po_id,
                    old_status: format!("{:?}", po.status),
                    new_status: "IN_PROGRESS".to_string(),
                })
                .await;

            if let Some(co_id) = po.source_customer_order_id {
                self.create_final_assembly_orders_for_production_order(po_id, co_id).await?;
            }
        }

        Ok(())
    }

    /// Called once every FinalAssemblyOrder sourced from this PO has
    /// submitted: closes the PO, then its originating CustomerOrder.
    pub(crate) async fn maybe_complete_production_order_via_final_assembly(&self, po_id: Uuid) -> Result<(), AppError> {
        let po = self.get_production_order(po_id).await?;
        if po.status == ProductionOrderStatus::Completed {
            return Ok(());
        }

        let now = Utc::now();
        let mut am: production_order::ActiveModel = po.clone().into();
        am.status = Set(ProductionOrderStatus::Completed);
        am.updated_at = Set(now);
        am.version = Set(po.version + 1);
        am.update(self.db.as_ref()).await.map_err(AppError::database)?;

        let _ = self
            .events
            .send(Event::ProductionOrderStatusChanged {
                order_id: po_id,
                old_status: format!("{:?}", po.status),
                new_status: "COMPLETED".to_string(),
            })
            .await;

        if let Some(co_id) = po.source_customer_order_id {
            self.complete_customer_order(co_id).await?;
        }
        Ok(())
    }
}
