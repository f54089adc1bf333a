use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use uuid::Uuid;

use crate::entities::enums::{AdjustReason, ItemType, WorkstationOrderStatus};
use crate::entities::workstation_order;
use crate::errors::AppError;
use crate::events::Event;

use super::OrderOrchestrator;

const MODULES_SUPERMARKET: i32 = 8;

impl OrderOrchestrator {
    async fn get_workstation_order(&self, id: Uuid) -> Result<workstation_order::Model, AppError> {
        workstation_order::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| AppError::OrderNotFound(format!("workstation order {id} not found")))
    }

    /// §4.1 `startWorkstationOrder`. Invariant 7: a workstation order is
    /// never startable before its sibling SupplyOrder (if any) is FULFILLED.
    /// That invariant is enforced at the PENDING->CONFIRMED transition (see
    /// `confirm_sibling_workstation_order` / `dispatch_control_order`), so
    /// starting only requires CONFIRMED here.
    #[tracing::instrument(skip(self))]
    pub async fn start_workstation_order(&self, id: Uuid) -> Result<(), AppError> {
        let order = self.get_workstation_order(id).await?;
        if order.status != WorkstationOrderStatus::Confirmed {
            return Err(AppError::OrderInvalidState(format!("workstation order {id} is {:?}, expected CONFIRMED", order.status)));
        }

        let now = Utc::now();
        let mut am: workstation_order::ActiveModel = order.clone().into();
        am.status = Set(WorkstationOrderStatus::InProgress);
        am.updated_at = Set(now);
        am.version = Set(order.version + 1);
        am.update(self.db.as_ref()).await.map_err(AppError::database)?;

        let _ = self
            .events
            .send(Event::WorkstationOrderStatusChanged {
                order_id: id,
                old_status: "CONFIRMED".to_string(),
                new_status: "IN_PROGRESS".to_string(),
            })
            .await;
        Ok(())
    }

    /// §4.1 `completeWorkstationOrder`. Manufacturing cells (WS-1..3) credit
    /// WS-8 and go straight to COMPLETED; gear/motor assembly (WS-4, WS-5)
    /// pass through COMPLETED_ASSEMBLY first and credit WS-8 on the following
    /// call, matching the ladder in §3.
    #[tracing::instrument(skip(self))]
    pub async fn complete_workstation_order(&self, id: Uuid) -> Result<(), AppError> {
        let order = self.get_workstation_order(id).await?;

        match order.status {
            WorkstationOrderStatus::InProgress if order.kind.is_manufacturing() => {
                self.credit_and_finish_workstation_order(order).await
            }
            WorkstationOrderStatus::InProgress => self.advance_to_completed_assembly(order).await,
            WorkstationOrderStatus::CompletedAssembly => self.credit_and_finish_workstation_order(order).await,
            other => Err(AppError::OrderInvalidState(format!("workstation order {id} is {other:?}, cannot complete"))),
        }
    }

    async fn advance_to_completed_assembly(&self, order: workstation_order::Model) -> Result<(), AppError> {
        let id = order.id;
        let now = Utc::now();
        let mut am: workstation_order::ActiveModel = order.clone().into();
        am.status = Set(WorkstationOrderStatus::CompletedAssembly);
        am.updated_at = Set(now);
        am.version = Set(order.version + 1);
        am.update(self.db.as_ref()).await.map_err(AppError::database)?;

        let _ = self
            .events
            .send(Event::WorkstationOrderStatusChanged {
                order_id: id,
                old_status: "IN_PROGRESS".to_string(),
                new_status: "COMPLETED_ASSEMBLY".to_string(),
            })
            .await;
        Ok(())
    }

    async fn credit_and_finish_workstation_order(&self, order: workstation_order::Model) -> Result<(), AppError> {
        let id = order.id;
        let old_status = format!("{:?}", order.status);

        self.inventory
            .adjust(
                MODULES_SUPERMARKET,
                ItemType::Module,
                order.item_id,
                order.quantity as i64,
                AdjustReason::Production,
                Some("WorkstationOrder".to_string()),
                Some(id),
                None,
                Some(format!("WorkstationOrder:{id}:complete")),
            )
            .await?;

        let now = Utc::now();
        let mut am: workstation_order::ActiveModel = order.clone().into();
        am.status = Set(WorkstationOrderStatus::Completed);
        am.updated_at = Set(now);
        am.version = Set(order.version + 1);
        am.update(self.db.as_ref()).await.map_err(AppError::database)?;

        let _ = self
            .events
            .send(Event::WorkstationOrderStatusChanged { order_id: id, old_status, new_status: "COMPLETED".to_string() })
            .await;

        self.maybe_complete_control_order(order.control_order_id).await
    }
}
