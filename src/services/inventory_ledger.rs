use chrono::Utc;
use dashmap::DashMap;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionTrait};
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use uuid::Uuid;

use crate::entities::enums::{AdjustReason, ItemType};
use crate::entities::{stock_ledger_entry, stock_record};
use crate::errors::AppError;
use crate::events::{Event, EventSender};

type StockKey = (i32, ItemType, i64);

/// §4.4 Inventory Ledger. Authoritative per-`(workstation, itemType, itemId)`
/// stock, with every mutation appending exactly one immutable ledger entry.
/// `locks` gives each key its own serialization domain so concurrent adjusts
/// on the same key never interleave, while different keys proceed in
/// parallel (§5).
#[derive(Clone)]
pub struct InventoryLedgerService {
    db: Arc<DatabaseConnection>,
    events: EventSender,
    locks: Arc<DashMap<StockKey, Arc<AsyncMutex<()>>>>,
}

#[derive(Debug, Clone)]
pub struct StockFilter {
    pub workstation_id: Option<i32>,
    pub item_type: Option<ItemType>,
    pub item_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct AdjustRequest {
    pub workstation_id: i32,
    pub item_type: ItemType,
    pub item_id: i64,
    pub delta: i64,
    pub reason: AdjustReason,
    pub ref_order_type: Option<String>,
    pub ref_order_id: Option<Uuid>,
    pub actor: Option<String>,
    pub idempotency_key: Option<String>,
}

impl InventoryLedgerService {
    pub fn new(db: Arc<DatabaseConnection>, events: EventSender) -> Self {
        Self { db, events, locks: Arc::new(DashMap::new()) }
    }

    fn lock_for(&self, key: StockKey) -> Arc<AsyncMutex<()>> {
        self.locks.entry(key).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_stock(&self, filter: StockFilter) -> Result<Vec<stock_record::Model>, AppError> {
        let mut query = stock_record::Entity::find();
        if let Some(ws) = filter.workstation_id {
            query = query.filter(stock_record::Column::WorkstationId.eq(ws));
        }
        if let Some(item_type) = filter.item_type {
            query = query.filter(stock_record::Column::ItemType.eq(item_type));
        }
        if let Some(item_id) = filter.item_id {
            query = query.filter(stock_record::Column::ItemId.eq(item_id));
        }
        query.all(self.db.as_ref()).await.map_err(AppError::from)
    }

    async fn find_by_idempotency_key(&self, key: &str) -> Result<Option<stock_ledger_entry::Model>, AppError> {
        stock_ledger_entry::Entity::find()
            .filter(stock_ledger_entry::Column::IdempotencyKey.eq(key))
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from)
    }

    /// §4.4 `adjust`. `delta > 0` credits, `delta < 0` debits with the
    /// precondition `current + delta >= 0`. Replays of a previously seen
    /// `idempotency_key` return the prior resulting quantity unchanged and do
    /// not append a second ledger entry.
    #[allow(clippy::too_many_arguments)]
    #[tracing::instrument(skip(self))]
    pub async fn adjust(
        &self,
        workstation_id: i32,
        item_type: ItemType,
        item_id: i64,
        delta: i64,
        reason: AdjustReason,
        ref_order_type: Option<String>,
        ref_order_id: Option<Uuid>,
        actor: Option<String>,
        idempotency_key: Option<String>,
    ) -> Result<stock_record::Model, AppError> {
        let key = (workstation_id, item_type, item_id);
        let lock = self.lock_for(key);
        let _guard = lock.lock().await;

        if let Some(ref idem) = idempotency_key {
            if self.find_by_idempotency_key(idem).await?.is_some() {
                return self.current_record(workstation_id, item_type, item_id).await;
            }
        }

        let txn = self.db.begin().await.map_err(AppError::database)?;

        let existing = stock_record::Entity::find()
            .filter(stock_record::Column::WorkstationId.eq(workstation_id))
            .filter(stock_record::Column::ItemType.eq(item_type))
            .filter(stock_record::Column::ItemId.eq(item_id))
            .one(&txn)
            .await
            .map_err(AppError::database)?;

        let current_quantity = existing.as_ref().map(|r| r.quantity).unwrap_or(0);
        let new_quantity = current_quantity + delta;

        if new_quantity < 0 {
            return Err(AppError::InventoryValidationError(format!(
                "adjust would drive ({workstation_id}, {item_type:?}, {item_id}) negative: current={current_quantity}, delta={delta}"
            )));
        }

        let now = Utc::now();
        let record = match existing {
            Some(model) => {
                let mut am: stock_record::ActiveModel = model.into();
                am.quantity = Set(new_quantity);
                am.last_updated = Set(now);
                am.update(&txn).await.map_err(AppError::database)?
            }
            None => {
                let am = stock_record::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    workstation_id: Set(workstation_id),
                    item_type: Set(item_type),
                    item_id: Set(item_id),
                    quantity: Set(new_quantity),
                    last_updated: Set(now),
                };
                am.insert(&txn).await.map_err(AppError::database)?
            }
        };

        let ledger_entry = stock_ledger_entry::ActiveModel {
            id: Set(Uuid::new_v4()),
            ts: Set(now),
            workstation_id: Set(workstation_id),
            item_type: Set(item_type),
            item_id: Set(item_id),
            delta: Set(delta),
            reason: Set(reason),
            ref_order_type: Set(ref_order_type),
            ref_order_id: Set(ref_order_id),
            actor: Set(actor),
            idempotency_key: Set(idempotency_key),
        };
        ledger_entry.insert(&txn).await.map_err(AppError::database)?;

        txn.commit().await.map_err(AppError::database)?;

        let _ = self
            .events
            .send(Event::InventoryAdjusted {
                workstation_id,
                item_type,
                item_id,
                delta,
                new_quantity,
                reason,
                ts: now,
            })
            .await;

        Ok(record)
    }

    /// Debits/credits every key in `requests` inside a single transaction: if
    /// any one of them would drive its key negative, the whole batch fails
    /// with `ORDER_INSUFFICIENT_STOCK` and nothing is committed — no partial
    /// debit, no ledger entry, matching §4.1's DIRECT_FULFILLMENT atomicity
    /// requirement. Locks are taken for every distinct key up front, in a
    /// fixed order, so concurrent batches over overlapping keys cannot
    /// deadlock.
    #[tracing::instrument(skip(self, requests))]
    pub async fn adjust_many(&self, requests: Vec<AdjustRequest>) -> Result<Vec<stock_record::Model>, AppError> {
        let mut keys: Vec<StockKey> = requests.iter().map(|r| (r.workstation_id, r.item_type, r.item_id)).collect();
        keys.sort();
        keys.dedup();
        let locks: Vec<_> = keys.iter().map(|k| self.lock_for(*k)).collect();
        let mut _guards = Vec::with_capacity(locks.len());
        for lock in &locks {
            _guards.push(lock.lock().await);
        }

        let txn = self.db.begin().await.map_err(AppError::database)?;
        let mut records = Vec::with_capacity(requests.len());
        let mut pending_events = Vec::with_capacity(requests.len());

        for req in &requests {
            if let Some(ref idem) = req.idempotency_key {
                let seen = stock_ledger_entry::Entity::find()
                    .filter(stock_ledger_entry::Column::IdempotencyKey.eq(idem.as_str()))
                    .one(&txn)
                    .await
                    .map_err(AppError::database)?
                    .is_some();
                if seen {
                    let record = stock_record::Entity::find()
                        .filter(stock_record::Column::WorkstationId.eq(req.workstation_id))
                        .filter(stock_record::Column::ItemType.eq(req.item_type))
                        .filter(stock_record::Column::ItemId.eq(req.item_id))
                        .one(&txn)
                        .await
                        .map_err(AppError::database)?
                        .ok_or_else(|| {
                            AppError::InventoryNotFound(format!(
                                "no stock record for ({}, {:?}, {})",
                                req.workstation_id, req.item_type, req.item_id
                            ))
                        })?;
                    records.push(record);
                    continue;
                }
            }

            let existing = stock_record::Entity::find()
                .filter(stock_record::Column::WorkstationId.eq(req.workstation_id))
                .filter(stock_record::Column::ItemType.eq(req.item_type))
                .filter(stock_record::Column::ItemId.eq(req.item_id))
                .one(&txn)
                .await
                .map_err(AppError::database)?;

            let current_quantity = existing.as_ref().map(|r| r.quantity).unwrap_or(0);
            let new_quantity = current_quantity + req.delta;

            if new_quantity < 0 {
                return Err(AppError::OrderInsufficientStock(format!(
                    "adjust would drive ({}, {:?}, {}) negative: current={current_quantity}, delta={}",
                    req.workstation_id, req.item_type, req.item_id, req.delta
                )));
            }

            let now = Utc::now();
            let record = match existing {
                Some(model) => {
                    let mut am: stock_record::ActiveModel = model.into();
                    am.quantity = Set(new_quantity);
                    am.last_updated = Set(now);
                    am.update(&txn).await.map_err(AppError::database)?
                }
                None => {
                    let am = stock_record::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        workstation_id: Set(req.workstation_id),
                        item_type: Set(req.item_type),
                        item_id: Set(req.item_id),
                        quantity: Set(new_quantity),
                        last_updated: Set(now),
                    };
                    am.insert(&txn).await.map_err(AppError::database)?
                }
            };

            let ledger_entry = stock_ledger_entry::ActiveModel {
                id: Set(Uuid::new_v4()),
                ts: Set(now),
                workstation_id: Set(req.workstation_id),
                item_type: Set(req.item_type),
                item_id: Set(req.item_id),
                delta: Set(req.delta),
                reason: Set(req.reason),
                ref_order_type: Set(req.ref_order_type.clone()),
                ref_order_id: Set(req.ref_order_id),
                actor: Set(req.actor.clone()),
                idempotency_key: Set(req.idempotency_key.clone()),
            };
            ledger_entry.insert(&txn).await.map_err(AppError::database)?;

            pending_events.push(Event::InventoryAdjusted {
                workstation_id: req.workstation_id,
                item_type: req.item_type,
                item_id: req.item_id,
                delta: req.delta,
                new_quantity,
                reason: req.reason,
                ts: now,
            });
            records.push(record);
        }

        txn.commit().await.map_err(AppError::database)?;

        for event in pending_events {
            let _ = self.events.send(event).await;
        }

        Ok(records)
    }

    async fn current_record(
        &self,
        workstation_id: i32,
        item_type: ItemType,
        item_id: i64,
    ) -> Result<stock_record::Model, AppError> {
        stock_record::Entity::find()
            .filter(stock_record::Column::WorkstationId.eq(workstation_id))
            .filter(stock_record::Column::ItemType.eq(item_type))
            .filter(stock_record::Column::ItemId.eq(item_id))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| AppError::InventoryNotFound(format!("no stock record for ({workstation_id}, {item_type:?}, {item_id})")))
    }

    /// §4.4 `listAlerts`: records at or below `threshold`, for reorder review.
    #[tracing::instrument(skip(self))]
    pub async fn list_alerts(&self, threshold: i64) -> Result<Vec<stock_record::Model>, AppError> {
        stock_record::Entity::find()
            .filter(stock_record::Column::Quantity.lte(threshold))
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from)
    }

    /// Returns whether `requested` units of `(item_type, item_id)` are
    /// available at `workstation_id`, without mutating anything. Used by the
    /// scenario selector's stock-snapshot step.
    #[tracing::instrument(skip(self))]
    pub async fn available(&self, workstation_id: i32, item_type: ItemType, item_id: i64) -> Result<i64, AppError> {
        let record = stock_record::Entity::find()
            .filter(stock_record::Column::WorkstationId.eq(workstation_id))
            .filter(stock_record::Column::ItemType.eq(item_type))
            .filter(stock_record::Column::ItemId.eq(item_id))
            .one(self.db.as_ref())
            .await?;
        Ok(record.map(|r| r.quantity).unwrap_or(0))
    }
}
