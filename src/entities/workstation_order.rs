use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::enums::{WorkstationOrderKind, WorkstationOrderStatus};

/// One manufacturing-cell unit of work under a control order. `item_id` always
/// names a MODULE. Cannot start until its `supply_order_id`, if set, is FULFILLED.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "workstation_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub number: String,
    pub control_order_id: Uuid,
    pub kind: WorkstationOrderKind,
    pub workstation_id: i32,
    pub item_id: i64,
    pub quantity: i32,
    pub supply_order_id: Option<Uuid>,
    pub status: WorkstationOrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::control_order::Entity",
        from = "Column::ControlOrderId",
        to = "super::control_order::Column::Id"
    )]
    ControlOrder,
    #[sea_orm(
        belongs_to = "super::supply_order::Entity",
        from = "Column::SupplyOrderId",
        to = "super::supply_order::Column::Id"
    )]
    SupplyOrder,
}

impl Related<super::control_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ControlOrder.def()
    }
}

impl Related<super::supply_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SupplyOrder.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
