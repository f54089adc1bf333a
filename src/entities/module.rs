use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A component produced by a manufacturing or assembly cell, stocked at WS-8.
///
/// Invariant (enforced at BOM ingest, not here): if `production_workstation_id`
/// is an assembly cell (4..6) its BOM children must all already be produced
/// modules or parts; if it is a manufacturing cell (1..3) its children must
/// all be parts.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "modules")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub name: String,
    pub production_workstation_id: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_assembly_produced(&self) -> bool {
        (4..=6).contains(&self.production_workstation_id)
    }

    pub fn is_manufacturing_produced(&self) -> bool {
        (1..=3).contains(&self.production_workstation_id)
    }
}
