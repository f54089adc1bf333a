use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::entities::enums::{AdjustReason, ItemType, SupplyOrderStatus, WorkstationOrderStatus};
use crate::entities::{supply_order, supply_order_item, workstation_order};
use crate::errors::AppError;
use crate::events::Event;

use super::OrderOrchestrator;

const PARTS_SUPPLY: i32 = 9;

impl OrderOrchestrator {
    async fn get_supply_order(&self, id: Uuid) -> Result<supply_order::Model, AppError> {
        supply_order::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| AppError::OrderNotFound(format!("supply order {id} not found")))
    }

    /// §4.1 `fulfillSupplyOrder`: debits WS-9 for every part line, then flips
    /// to FULFILLED — the signal gating its sibling workstation order's start.
    #[tracing::instrument(skip(self))]
    pub async fn fulfill_supply_order(&self, id: Uuid) -> Result<(), AppError> {
        let order = self.get_supply_order(id).await?;
        if order.status != SupplyOrderStatus::Pending {
            return Err(AppError::OrderInvalidState(format!("supply order {id} is {:?}, expected PENDING", order.status)));
        }

        let items = supply_order_item::Entity::find()
            .filter(supply_order_item::Column::SupplyOrderId.eq(id))
            .all(self.db.as_ref())
            .await
            .map_err(AppError::database)?;

        for item in &items {
            self.inventory
                .adjust(
                    PARTS_SUPPLY,
                    ItemType::Part,
                    item.part_id,
                    -(item.quantity as i64),
                    AdjustReason::Consumption,
                    Some("SupplyOrder".to_string()),
                    Some(id),
                    None,
                    Some(format!("SupplyOrder:{id}:fulfill:{}", item.part_id)),
                )
                .await?;
        }

        let now = Utc::now();
        let mut am: supply_order::ActiveModel = order.clone().into();
        am.status = Set(SupplyOrderStatus::Fulfilled);
        am.updated_at = Set(now);
        am.version = Set(order.version + 1);
        am.update(self.db.as_ref()).await.map_err(AppError::database)?;

        let _ = self
            .events
            .send(Event::SupplyOrderStatusChanged {
                order_id: id,
                old_status: "PENDING".to_string(),
                new_status: "FULFILLED".to_string(),
            })
            .await;

        self.confirm_sibling_workstation_order(id).await?;
        Ok(())
    }

    /// Invariant 7: the sibling workstation order may only leave PENDING once
    /// this SupplyOrder is FULFILLED. That gate is this CONFIRMED transition.
    async fn confirm_sibling_workstation_order(&self, supply_order_id: Uuid) -> Result<(), AppError> {
        let Some(wso) = workstation_order::Entity::find()
            .filter(workstation_order::Column::SupplyOrderId.eq(supply_order_id))
            .one(self.db.as_ref())
            .await
            .map_err(AppError::database)?
        else {
            return Ok(());
        };
        if wso.status != WorkstationOrderStatus::Pending {
            return Ok(());
        }

        let wso_id = wso.id;
        let next_version = wso.version + 1;
        let now = Utc::now();
        let mut am: workstation_order::ActiveModel = wso.into();
        am.status = Set(WorkstationOrderStatus::Confirmed);
        am.updated_at = Set(now);
        am.version = Set(next_version);
        am.update(self.db.as_ref()).await.map_err(AppError::database)?;

        let _ = self
            .events
            .send(Event::WorkstationOrderStatusChanged {
                order_id: wso_id,
                old_status: "PENDING".to_string(),
                new_status: "CONFIRMED".to_string(),
            })
            .await;
        Ok(())
    }

    /// Terminal rejection path (e.g. a part is permanently out of stock
    /// upstream); does not gate anything further and is never auto-retried.
    #[tracing::instrument(skip(self))]
    pub async fn reject_supply_order(&self, id: Uuid) -> Result<(), AppError> {
        let order = self.get_supply_order(id).await?;
        if order.status != SupplyOrderStatus::Pending {
            return Err(AppError::OrderInvalidState(format!("supply order {id} is {:?}, expected PENDING", order.status)));
        }

        let now = Utc::now();
        let mut am: supply_order::ActiveModel = order.clone().into();
        am.status = Set(SupplyOrderStatus::Rejected);
        am.updated_at = Set(now);
        am.version = Set(order.version + 1);
        am.update(self.db.as_ref()).await.map_err(AppError::database)?;

        let _ = self
            .events
            .send(Event::SupplyOrderStatusChanged {
                order_id: id,
                old_status: "PENDING".to_string(),
                new_status: "REJECTED".to_string(),
            })
            .await;
        Ok(())
    }
}
