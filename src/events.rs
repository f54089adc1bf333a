use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::entities::enums::{AdjustReason, ItemType};

/// Domain events raised by the order orchestrator and inventory ledger.
/// Purely observational today (no subscriber is wired in `main.rs` beyond a
/// logging sink); the channel exists so handlers never block on downstream
/// consumers the way direct in-transaction side effects would.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    CustomerOrderCreated(Uuid),
    CustomerOrderStatusChanged { order_id: Uuid, old_status: String, new_status: String },
    WarehouseOrderCreated(Uuid),
    WarehouseOrderStatusChanged { order_id: Uuid, old_status: String, new_status: String },
    ProductionOrderCreated(Uuid),
    ProductionOrderStatusChanged { order_id: Uuid, old_status: String, new_status: String },
    ControlOrderStatusChanged { order_id: Uuid, old_status: String, new_status: String },
    SupplyOrderStatusChanged { order_id: Uuid, old_status: String, new_status: String },
    WorkstationOrderStatusChanged { order_id: Uuid, old_status: String, new_status: String },
    FinalAssemblyOrderStatusChanged { order_id: Uuid, old_status: String, new_status: String },
    InventoryAdjusted {
        workstation_id: i32,
        item_type: ItemType,
        item_id: i64,
        delta: i64,
        new_quantity: i64,
        reason: AdjustReason,
        ts: DateTime<Utc>,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender.send(event).await.map_err(|e| format!("failed to send event: {e}"))
    }
}

/// Builds a channel pair and a background task that logs every event.
/// `main.rs` spawns the returned future; production deployments would swap
/// this sink for a real subscriber without touching call sites.
pub fn spawn_event_logger(capacity: usize) -> (EventSender, tokio::task::JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel(capacity);
    let handle = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            tracing::debug!(?event, "domain event");
        }
    });
    (EventSender::new(tx), handle)
}
