use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use uuid::Uuid;

use crate::entities::enums::{AdjustReason, ControlOrderStatus as FinalAssemblyStatus, FinalAssemblyParentType, ItemType};
use crate::entities::{customer_order_item, final_assembly_order, warehouse_order};
use crate::errors::AppError;
use crate::events::Event;

use super::OrderOrchestrator;

const FINAL_ASSEMBLY_PREFIX: &str = "FA";
const PLANT_WAREHOUSE: i32 = 7;

impl OrderOrchestrator {
    async fn get_final_assembly_order(&self, id: Uuid) -> Result<final_assembly_order::Model, AppError> {
        final_assembly_order::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| AppError::OrderNotFound(format!("final assembly order {id} not found")))
    }

    async fn create_final_assembly_order(
        &self,
        parent_type: FinalAssemblyParentType,
        parent_id: Uuid,
        output_product_id: i64,
    ) -> Result<(), AppError> {
        // MUST resolve to a PRODUCT (invariant 3 / testable property 4).
        self.master_data
            .get_product(output_product_id)
            .await
            .map_err(|_| AppError::MasterDataNotFound(format!("final assembly output {output_product_id} is not a known product")))?;

        let txn = self.db.begin().await.map_err(AppError::database)?;
        let number = Self::next_order_number(&txn, FINAL_ASSEMBLY_PREFIX).await?;
        let now = Utc::now();
        let id = Uuid::new_v4();

        let fa = final_assembly_order::ActiveModel {
            id: Set(id),
            number: Set(number),
            parent_type: Set(parent_type),
            parent_id: Set(parent_id),
            output_product_id: Set(output_product_id),
            output_quantity: Set(1),
            supply_order_id: Set(None),
            status: Set(FinalAssemblyStatus::InProgress),
            created_at: Set(now),
            updated_at: Set(now),
            version: Set(0),
        };
        fa.insert(&txn).await.map_err(AppError::database)?;
        txn.commit().await.map_err(AppError::database)?;
        Ok(())
    }

    /// §4.1 `fulfillWarehouseOrder`'s FA fan-out: one FinalAssemblyOrder per
    /// requested unit of the originating CustomerOrder's product lines
    /// (matching the S2 seed scenario: requestedQuantity=2 of one product
    /// yields two single-unit FinalAssemblyOrders at WS-6).
    pub(crate) async fn create_final_assembly_orders_for_warehouse_order(&self, order: &warehouse_order::Model) -> Result<(), AppError> {
        let Some(co_id) = order.customer_order_id else {
            return Ok(());
        };
        let items = customer_order_item::Entity::find()
            .filter(customer_order_item::Column::CustomerOrderId.eq(co_id))
            .all(self.db.as_ref())
            .await
            .map_err(AppError::database)?;

        for item in items {
            for _ in 0..item.quantity {
                self.create_final_assembly_order(FinalAssemblyParentType::WarehouseOrder, order.id, item.product_id).await?;
            }
        }
        Ok(())
    }

    /// Same fan-out rule for the direct-production path (Scenario 4).
    pub(crate) async fn create_final_assembly_orders_for_production_order(&self, po_id: Uuid, co_id: Uuid) -> Result<(), AppError> {
        let items = customer_order_item::Entity::find()
            .filter(customer_order_item::Column::CustomerOrderId.eq(co_id))
            .all(self.db.as_ref())
            .await
            .map_err(AppError::database)?;

        for item in items {
            for _ in 0..item.quantity {
                self.create_final_assembly_order(FinalAssemblyParentType::ProductionOrder, po_id, item.product_id).await?;
            }
        }
        Ok(())
    }

    pub(crate) async fn all_final_assembly_orders_completed_for_warehouse_order(&self, wo_id: Uuid) -> Result<bool, AppError> {
        let fas = final_assembly_order::Entity::find()
            .filter(final_assembly_order::Column::ParentType.eq(FinalAssemblyParentType::WarehouseOrder))
            .filter(final_assembly_order::Column::ParentId.eq(wo_id))
            .all(self.db.as_ref())
            .await
            .map_err(AppError::database)?;
        Ok(!fas.is_empty() && fas.iter().all(|f| f.status == FinalAssemblyStatus::Completed))
    }

    async fn all_final_assembly_orders_completed_for_production_order(&self, po_id: Uuid) -> Result<bool, AppError> {
        let fas = final_assembly_order::Entity::find()
            .filter(final_assembly_order::Column::ParentType.eq(FinalAssemblyParentType::ProductionOrder))
            .filter(final_assembly_order::Column::ParentId.eq(po_id))
            .all(self.db.as_ref())
            .await
            .map_err(AppError::database)?;
        Ok(!fas.is_empty() && fas.iter().all(|f| f.status == FinalAssemblyStatus::Completed))
    }

    /// §4.1 `submitFinalAssemblyOrder`. Credits WS-7 with the finished
    /// product, then propagates completion to the parent WarehouseOrder or
    /// ProductionOrder per the auto-completion rule.
    ///
    /// `FinalAssemblyStatus` reuses `ControlOrderStatus`: `InProgress` stands
    /// in for the spec's `COMPLETED_ASSEMBLY` (assembly physically done,
    /// pending submission) rather than adding a near-duplicate enum.
    #[tracing::instrument(skip(self))]
    pub async fn submit_final_assembly_order(&self, id: Uuid) -> Result<(), AppError> {
        let order = self.get_final_assembly_order(id).await?;
        if order.status != FinalAssemblyStatus::InProgress {
            return Err(AppError::OrderInvalidState(format!("final assembly order {id} is {:?}, expected IN_PROGRESS", order.status)));
        }

        self.inventory
            .adjust(
                PLANT_WAREHOUSE,
                ItemType::Product,
                order.output_product_id,
                order.output_quantity as i64,
                AdjustReason::Production,
                Some("FinalAssemblyOrder".to_string()),
                Some(id),
                None,
                Some(format!("FinalAssemblyOrder:{id}:submit")),
            )
            .await?;

        let now = Utc::now();
        let mut am: final_assembly_order::ActiveModel = order.clone().into();
        am.status = Set(FinalAssemblyStatus::Completed);
        am.updated_at = Set(now);
        am.version = Set(order.version + 1);
        am.update(self.db.as_ref()).await.map_err(AppError::database)?;

        let _ = self
            .events
            .send(Event::FinalAssemblyOrderStatusChanged {
                order_id: id,
                old_status: "IN_PROGRESS".to_string(),
                new_status: "COMPLETED".to_string(),
            })
            .await;

        match order.parent_type {
            FinalAssemblyParentType::WarehouseOrder => {
                self.maybe_complete_warehouse_order(order.parent_id).await?;
            }
            FinalAssemblyParentType::ProductionOrder => {
                if self.all_final_assembly_orders_completed_for_production_order(order.parent_id).await? {
                    self.maybe_complete_production_order_via_final_assembly(order.parent_id).await?;
                }
            }
        }
        Ok(())
    }
}
