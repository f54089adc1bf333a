use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::enums::SupplyOrderStatus;

/// SO-n. A workstation's request to WS-9 (Parts Supply) for the parts its
/// control order needs; fulfillment gates the corresponding workstation order.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "supply_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub number: String,
    pub control_order_id: Uuid,
    pub requesting_workstation_id: i32,
    pub status: SupplyOrderStatus,
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
    #[sea_orm(has_many = "super::supply_order_item::Entity")]
    Items,
}

impl Related<super::control_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ControlOrder.def()
    }
}

impl Related<super::supply_order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
