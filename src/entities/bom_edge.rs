use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::enums::ItemType;

/// One directed BOM edge: `parent (Product|Module) -> child (Module|Part) x quantity`.
///
/// The full BOM graph is a DAG; cycles are rejected at ingest time (see
/// `MasterDataService::add_bom_edge`), never relied on recursion limits at
/// expansion time.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bom_edges")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub parent_type: ItemType,
    pub parent_id: i64,
    pub child_type: ItemType,
    pub child_id: i64,
    pub quantity: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
