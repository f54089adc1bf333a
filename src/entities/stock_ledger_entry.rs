use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::enums::{AdjustReason, ItemType};

/// An immutable record of one inventory delta. The source of truth for audit;
/// never updated or deleted once written.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub ts: DateTime<Utc>,
    pub workstation_id: i32,
    pub item_type: ItemType,
    pub item_id: i64,
    pub delta: i64,
    pub reason: AdjustReason,
    pub ref_order_type: Option<String>,
    pub ref_order_id: Option<Uuid>,
    pub actor: Option<String>,
    /// Set when the originating `adjust` call carried an idempotency key;
    /// the unique index on this column is what makes retried adjusts a no-op.
    pub idempotency_key: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
