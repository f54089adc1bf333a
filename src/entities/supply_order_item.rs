use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A line on a SupplyOrder: a part and a quantity.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "supply_order_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub supply_order_id: Uuid,
    pub part_id: i64,
    pub quantity: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::supply_order::Entity",
        from = "Column::SupplyOrderId",
        to = "super::supply_order::Column::Id"
    )]
    SupplyOrder,
    #[sea_orm(
        belongs_to = "super::part::Entity",
        from = "Column::PartId",
        to = "super::part::Column::Id"
    )]
    Part,
}

impl Related<super::supply_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SupplyOrder.def()
    }
}

impl Related<super::part::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Part.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
