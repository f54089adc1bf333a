use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::enums::ItemType;

/// Authoritative on-hand quantity for one `(workstation, item)` key.
///
/// Invariant: `quantity` always equals the sum of `StockLedgerEntry::delta`
/// for the same key, and is never negative (see `InventoryLedgerService`).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub workstation_id: i32,
    pub item_type: ItemType,
    pub item_id: i64,
    pub quantity: i64,
    pub last_updated: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
