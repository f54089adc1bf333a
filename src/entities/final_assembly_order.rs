use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::enums::{ControlOrderStatus as FinalAssemblyStatus, FinalAssemblyParentType};

/// FA-n. The terminal step of a WarehouseOrder or ProductionOrder: assembling
/// the output product out of already-produced modules at WS-6.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "final_assembly_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub number: String,
    pub parent_type: FinalAssemblyParentType,
    pub parent_id: Uuid,
    pub output_product_id: i64,
    pub output_quantity: i32,
    pub supply_order_id: Option<Uuid>,
    pub status: FinalAssemblyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::OutputProductId",
        to = "super::product::Column::Id"
    )]
    Product,
    #[sea_orm(
        belongs_to = "super::supply_order::Entity",
        from = "Column::SupplyOrderId",
        to = "super::supply_order::Column::Id"
    )]
    SupplyOrder,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::supply_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SupplyOrder.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
