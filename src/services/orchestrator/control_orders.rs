use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use uuid::Uuid;

use crate::entities::enums::{ControlOrderStatus, ItemType, SupplyOrderStatus, WorkstationOrderKind, WorkstationOrderStatus};
use crate::entities::{control_order, supply_order, supply_order_item, workstation_order};
use crate::errors::AppError;
use crate::events::Event;

use super::OrderOrchestrator;

const SUPPLY_ORDER_PREFIX: &str = "SO";
const WORKSTATION_ORDER_PREFIX: &str = "WSO";

fn kind_for_workstation(workstation_id: i32) -> Result<WorkstationOrderKind, AppError> {
    match workstation_id {
        1 => Ok(WorkstationOrderKind::InjectionMolding),
        2 => Ok(WorkstationOrderKind::PartsPreProduction),
        3 => Ok(WorkstationOrderKind::PartFinishing),
        4 => Ok(WorkstationOrderKind::GearAssembly),
        5 => Ok(WorkstationOrderKind::MotorAssembly),
        other => Err(AppError::Internal(format!("workstation {other} has no workstation-order kind"))),
    }
}

impl OrderOrchestrator {
    async fn get_control_order(&self, id: Uuid) -> Result<control_order::Model, AppError> {
        control_order::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| AppError::OrderNotFound(format!("control order {id} not found")))
    }

    /// §4.1 `dispatchControlOrder`: splits the control order's target module
    /// into a SupplyOrder for its PART requirements (gating work at WS-9) and
    /// a single WorkstationOrder that performs the production/assembly step
    /// itself. Direct MODULE children are assumed already in stock, per the
    /// invariant that assembly modules depend only on already-produced items.
    #[tracing::instrument(skip(self))]
    pub async fn dispatch_control_order(&self, id: Uuid) -> Result<(), AppError> {
        let order = self.get_control_order(id).await?;
        if order.status != ControlOrderStatus::Pending {
            return Err(AppError::OrderInvalidState(format!("control order {id} is {:?}, expected PENDING", order.status)));
        }

        let children = self.bom.direct_children(ItemType::Module, order.item_id).await?;
        let parts: Vec<_> = children.iter().filter(|e| e.child_type == ItemType::Part).collect();

        let txn = self.db.begin().await.map_err(AppError::database)?;
        let now = Utc::now();

        let supply_order_id = if parts.is_empty() {
            None
        } else {
            let number = Self::next_order_number(&txn, SUPPLY_ORDER_PREFIX).await?;
            let so_id = Uuid::new_v4();
            let so = supply_order::ActiveModel {
                id: Set(so_id),
                number: Set(number),
                control_order_id: Set(id),
                requesting_workstation_id: Set(order.assigned_workstation_id),
                status: Set(SupplyOrderStatus::Pending),
                created_at: Set(now),
                updated_at: Set(now),
                version: Set(0),
            };
            so.insert(&txn).await.map_err(AppError::database)?;

            for edge in &parts {
                let quantity = edge.quantity as i64 * order.quantity as i64;
                let item = supply_order_item::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    supply_order_id: Set(so_id),
                    part_id: Set(edge.child_id),
                    quantity: Set(quantity as i32),
                };
                item.insert(&txn).await.map_err(AppError::database)?;
            }
            Some(so_id)
        };

        let kind = kind_for_workstation(order.assigned_workstation_id)?;
        let number = Self::next_order_number(&txn, WORKSTATION_ORDER_PREFIX).await?;
        // Invariant 7 gates PENDING->CONFIRMED on the sibling SupplyOrder being
        // FULFILLED (see `fulfill_supply_order`); with no PART requirements
        // there is nothing to gate on, so the order starts CONFIRMED already.
        let initial_status =
            if supply_order_id.is_some() { WorkstationOrderStatus::Pending } else { WorkstationOrderStatus::Confirmed };
        let wso = workstation_order::ActiveModel {
            id: Set(Uuid::new_v4()),
            number: Set(number),
            control_order_id: Set(id),
            kind: Set(kind),
            workstation_id: Set(order.assigned_workstation_id),
            item_id: Set(order.item_id),
            quantity: Set(order.quantity),
            supply_order_id: Set(supply_order_id),
            status: Set(initial_status),
            created_at: Set(now),
            updated_at: Set(now),
            version: Set(0),
        };
        wso.insert(&txn).await.map_err(AppError::database)?;

        let mut am: control_order::ActiveModel = order.clone().into();
        am.status = Set(ControlOrderStatus::Assigned);
        am.updated_at = Set(now);
        am.version = Set(order.version + 1);
        am.update(&txn).await.map_err(AppError::database)?;

        txn.commit().await.map_err(AppError::database)?;

        let _ = self
            .events
            .send(Event::ControlOrderStatusChanged {
                order_id: id,
                old_status: "PENDING".to_string(),
                new_status: "ASSIGNED".to_string(),
            })
            .await;
        Ok(())
    }

    /// Auto-completion rule (§4.1): a control order completes once all its
    /// workstation orders are COMPLETED.
    pub(crate) async fn maybe_complete_control_order(&self, id: Uuid) -> Result<(), AppError> {
        let order = self.get_control_order(id).await?;
        if order.status == ControlOrderStatus::Completed {
            return Ok(());
        }

        let siblings = workstation_order::Entity::find()
            .filter(workstation_order::Column::ControlOrderId.eq(id))
            .all(self.db.as_ref())
            .await
            .map_err(AppError::database)?;
        if siblings.is_empty() || !siblings.iter().all(|w| w.status == WorkstationOrderStatus::Completed) {
            return Ok(());
        }

        let now = Utc::now();
        let mut am: control_order::ActiveModel = order.clone().into();
        am.status = Set(ControlOrderStatus::Completed);
        am.updated_at = Set(now);
        am.version = Set(order.version + 1);
        am.update(self.db.as_ref()).await.map_err(AppError::database)?;

        let _ = self
            .events
            .send(Event::ControlOrderStatusChanged {
                order_id: id,
                old_status: format!("{:?}", order.status),
                new_status: "COMPLETED".to_string(),
            })
            .await;

        self.maybe_complete_production_order(order.production_order_id).await
    }
}
