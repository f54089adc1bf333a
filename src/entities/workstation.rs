use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::enums::WorkstationRole;

/// One of the nine fixed stations in the factory. Seeded once; immutable thereafter.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "workstations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub role: WorkstationRole,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
