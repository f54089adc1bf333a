use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::enums::{Priority, ProductionOrderStatus};

/// PO-n. Sourced from exactly one of a CustomerOrder or a WarehouseOrder;
/// optionally carries the scheduler's proposed schedule id.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "production_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub number: String,
    pub source_customer_order_id: Option<Uuid>,
    pub source_warehouse_order_id: Option<Uuid>,
    pub schedule_id: Option<String>,
    pub status: ProductionOrderStatus,
    pub priority: Priority,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer_order::Entity",
        from = "Column::SourceCustomerOrderId",
        to = "super::customer_order::Column::Id"
    )]
    CustomerOrder,
    #[sea_orm(
        belongs_to = "super::warehouse_order::Entity",
        from = "Column::SourceWarehouseOrderId",
        to = "super::warehouse_order::Column::Id"
    )]
    WarehouseOrder,
    #[sea_orm(has_many = "super::control_order::Entity")]
    ControlOrders,
}

impl Related<super::customer_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CustomerOrder.def()
    }
}

impl Related<super::warehouse_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WarehouseOrder.def()
    }
}

impl Related<super::control_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ControlOrders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Invariant: exactly one of the two sources is set. Validated at creation,
    /// re-checked here for anything reconstructed from a raw row.
    pub fn has_single_source(&self) -> bool {
        self.source_customer_order_id.is_some() ^ self.source_warehouse_order_id.is_some()
    }
}
