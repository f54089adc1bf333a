use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::enums::{ControlOrderKind, ControlOrderStatus};

/// PCO-n or ACO-n: one production-order line, assigned to a single workstation.
/// `item_id` always names a MODULE — control orders never target parts or products.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "control_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub number: String,
    pub kind: ControlOrderKind,
    pub production_order_id: Uuid,
    pub assigned_workstation_id: i32,
    pub item_id: i64,
    pub quantity: i32,
    pub status: ControlOrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::production_order::Entity",
        from = "Column::ProductionOrderId",
        to = "super::production_order::Column::Id"
    )]
    ProductionOrder,
    #[sea_orm(
        belongs_to = "super::module::Entity",
        from = "Column::ItemId",
        to = "super::module::Column::Id"
    )]
    Module,
    #[sea_orm(has_many = "super::supply_order::Entity")]
    SupplyOrders,
    #[sea_orm(has_many = "super::workstation_order::Entity")]
    WorkstationOrders,
}

impl Related<super::production_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductionOrder.def()
    }
}

impl Related<super::module::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Module.def()
    }
}

impl Related<super::supply_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SupplyOrders.def()
    }
}

impl Related<super::workstation_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkstationOrders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
