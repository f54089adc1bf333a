use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Process-wide key/value configuration store. The only mandated key is
/// `LOT_SIZE_THRESHOLD`; order-number sequence counters (`seq:CO`, `seq:WO`, ...)
/// also live here, mutated inside the same transaction as the order they number.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "system_configuration")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    pub value: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub const LOT_SIZE_THRESHOLD_KEY: &str = "LOT_SIZE_THRESHOLD";

pub fn sequence_key(prefix: &str) -> String {
    format!("seq:{prefix}")
}
