use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A line on a WarehouseOrder: a module and a quantity.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "warehouse_order_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub warehouse_order_id: Uuid,
    pub module_id: i64,
    pub quantity: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::warehouse_order::Entity",
        from = "Column::WarehouseOrderId",
        to = "super::warehouse_order::Column::Id"
    )]
    WarehouseOrder,
    #[sea_orm(
        belongs_to = "super::module::Entity",
        from = "Column::ModuleId",
        to = "super::module::Column::Id"
    )]
    Module,
}

impl Related<super::warehouse_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WarehouseOrder.def()
    }
}

impl Related<super::module::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Module.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
