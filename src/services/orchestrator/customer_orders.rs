use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::entities::enums::{AdjustReason, CustomerOrderScenario, CustomerOrderStatus, ItemType, Priority};
use crate::entities::{customer_order, customer_order_item};
use crate::errors::AppError;
use crate::events::Event;
use crate::services::inventory_ledger::AdjustRequest;
use crate::services::scenario_selector::{select_customer_order_scenario, StockAvailability};

use super::OrderOrchestrator;

const CUSTOMER_ORDER_PREFIX: &str = "CO";
const PLANT_WAREHOUSE: i32 = 7;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrderItemRequest {
    pub product_id: i64,
    /// §6: clients MUST send `requestedQuantity`; `quantity` is accepted as a
    /// backward-compatible synonym on ingest.
    #[serde(alias = "quantity")]
    #[validate(range(min = 1, message = "requested quantity must be positive"))]
    pub requested_quantity: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCustomerOrderRequest {
    #[validate(length(min = 1, message = "at least one order item is required"))]
    #[validate]
    pub items: Vec<CreateOrderItemRequest>,
    pub notes: Option<String>,
    #[serde(default)]
    pub priority: Priority,
}

#[derive(Debug, Serialize)]
pub struct CustomerOrderView {
    pub id: Uuid,
    pub number: String,
    pub status: CustomerOrderStatus,
    pub priority: Priority,
    pub trigger_scenario: Option<CustomerOrderScenario>,
    pub items: Vec<customer_order_item::Model>,
}

impl OrderOrchestrator {
    /// §4.1 `createCustomerOrder`.
    #[tracing::instrument(skip(self, request))]
    pub async fn create_customer_order(&self, request: CreateCustomerOrderRequest) -> Result<CustomerOrderView, AppError> {
        request.validate()?;

        for item in &request.items {
            // Validates every id is a PRODUCT; anything else is a caller error.
            self.master_data.get_product(item.product_id).await.map_err(|_| {
                AppError::InventoryValidationError(format!("item {} is not a known product", item.product_id))
            })?;
        }

        let txn = self.db.begin().await.map_err(AppError::database)?;
        let now = Utc::now();
        let number = Self::next_order_number(&txn, CUSTOMER_ORDER_PREFIX).await?;
        let order_id = Uuid::new_v4();

        let order = customer_order::ActiveModel {
            id: Set(order_id),
            number: Set(number.clone()),
            status: Set(CustomerOrderStatus::Pending),
            priority: Set(request.priority),
            trigger_scenario: Set(None),
            notes: Set(request.notes.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            version: Set(0),
        };
        order.insert(&txn).await.map_err(AppError::database)?;

        let mut items = Vec::with_capacity(request.items.len());
        for item in &request.items {
            let am = customer_order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                customer_order_id: Set(order_id),
                product_id: Set(item.product_id),
                quantity: Set(item.requested_quantity),
            };
            items.push(am.insert(&txn).await.map_err(AppError::database)?);
        }

        txn.commit().await.map_err(AppError::database)?;
        let _ = self.events.send(Event::CustomerOrderCreated(order_id)).await;

        Ok(CustomerOrderView {
            id: order_id,
            number,
            status: CustomerOrderStatus::Pending,
            priority: request.priority,
            trigger_scenario: None,
            items,
        })
    }

    async fn get_customer_order(&self, id: Uuid) -> Result<customer_order::Model, AppError> {
        customer_order::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| AppError::OrderNotFound(format!("customer order {id} not found")))
    }

    async fn get_customer_order_items(&self, id: Uuid) -> Result<Vec<customer_order_item::Model>, AppError> {
        customer_order_item::Entity::find()
            .filter(customer_order_item::Column::CustomerOrderId.eq(id))
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from)
    }

    /// §4.1 `confirmCustomerOrder`.
    #[tracing::instrument(skip(self))]
    pub async fn confirm_customer_order(&self, id: Uuid) -> Result<CustomerOrderView, AppError> {
        let order = self.get_customer_order(id).await?;
        if order.status != CustomerOrderStatus::Pending {
            return Err(AppError::OrderInvalidState(format!(
                "customer order {id} is {:?}, expected PENDING",
                order.status
            )));
        }

        let items = self.get_customer_order_items(id).await?;
        let mut availabilities = Vec::with_capacity(items.len());
        for item in &items {
            let available = self.inventory.available(PLANT_WAREHOUSE, ItemType::Product, item.product_id).await?;
            availabilities.push(StockAvailability { requested: item.quantity as i64, available });
        }

        let threshold = self.lot_size_threshold().await?;
        let scenario = select_customer_order_scenario(&availabilities, threshold as i64);

        let now = Utc::now();
        let expected_version = order.version;
        let mut am: customer_order::ActiveModel = order.clone().into();
        am.status = Set(CustomerOrderStatus::Confirmed);
        am.trigger_scenario = Set(Some(scenario));
        am.updated_at = Set(now);
        am.version = Set(expected_version + 1);
        let updated = am.update(self.db.as_ref()).await.map_err(AppError::database)?;

        let _ = self
            .events
            .send(Event::CustomerOrderStatusChanged {
                order_id: id,
                old_status: "PENDING".to_string(),
                new_status: "CONFIRMED".to_string(),
            })
            .await;

        Ok(CustomerOrderView {
            id: updated.id,
            number: updated.number,
            status: updated.status,
            priority: updated.priority,
            trigger_scenario: updated.trigger_scenario,
            items,
        })
    }

    /// §4.1 `fulfillCustomerOrder` dispatcher.
    #[tracing::instrument(skip(self))]
    pub async fn fulfill_customer_order(&self, id: Uuid) -> Result<CustomerOrderView, AppError> {
        let order = self.get_customer_order(id).await?;
        if order.status != CustomerOrderStatus::Confirmed {
            return Err(AppError::OrderInvalidState(format!(
                "customer order {id} is {:?}, expected CONFIRMED",
                order.status
            )));
        }
        let scenario = order
            .trigger_scenario
            .ok_or_else(|| AppError::Internal(format!("customer order {id} confirmed without a trigger scenario")))?;

        match scenario {
            CustomerOrderScenario::DirectFulfillment => self.fulfill_direct(order).await,
            CustomerOrderScenario::WarehouseOrderNeeded => self.fulfill_via_warehouse_order(order).await,
            CustomerOrderScenario::DirectProduction => self.fulfill_via_direct_production(order).await,
        }
    }

    async fn fulfill_direct(&self, order: customer_order::Model) -> Result<CustomerOrderView, AppError> {
        let items = self.get_customer_order_items(order.id).await?;

        // §4.1 DIRECT_FULFILLMENT: every item's debit must land atomically —
        // if one item would drive stock negative, none of them are applied.
        let requests = items
            .iter()
            .map(|item| AdjustRequest {
                workstation_id: PLANT_WAREHOUSE,
                item_type: ItemType::Product,
                item_id: item.product_id,
                delta: -(item.quantity as i64),
                reason: AdjustReason::Fulfillment,
                ref_order_type: Some("CustomerOrder".to_string()),
                ref_order_id: Some(order.id),
                actor: None,
                idempotency_key: Some(format!("CustomerOrder:{}:fulfill:{}", order.id, item.product_id)),
            })
            .collect();
        self.inventory.adjust_many(requests).await?;

        let now = Utc::now();
        let mut am: customer_order::ActiveModel = order.clone().into();
        am.status = Set(CustomerOrderStatus::Completed);
        am.updated_at = Set(now);
        am.version = Set(order.version + 1);
        let updated = am.update(self.db.as_ref()).await.map_err(AppError::database)?;

        let _ = self
            .events
            .send(Event::CustomerOrderStatusChanged {
                order_id: order.id,
                old_status: "CONFIRMED".to_string(),
                new_status: "COMPLETED".to_string(),
            })
            .await;

        Ok(CustomerOrderView {
            id: updated.id,
            number: updated.number,
            status: updated.status,
            priority: updated.priority,
            trigger_scenario: updated.trigger_scenario,
            items,
        })
    }

    async fn mark_processing(&self, order: &customer_order::Model) -> Result<(), AppError> {
        let now = Utc::now();
        let mut am: customer_order::ActiveModel = order.clone().into();
        am.status = Set(CustomerOrderStatus::Processing);
        am.updated_at = Set(now);
        am.version = Set(order.version + 1);
        am.update(self.db.as_ref()).await.map_err(AppError::database)?;

        let _ = self
            .events
            .send(Event::CustomerOrderStatusChanged {
                order_id: order.id,
                old_status: "CONFIRMED".to_string(),
                new_status: "PROCESSING".to_string(),
            })
            .await;
        Ok(())
    }

    /// Completes the CO after its downstream orders converge: debits WS-7 by
    /// the originally requested quantity (net effect: modules/production
    /// converted to finished product, visible in the ledger per §4.1's
    /// `submitFinalAssemblyOrder` propagation rule).
    pub(crate) async fn complete_customer_order(&self, id: Uuid) -> Result<(), AppError> {
        let order = self.get_customer_order(id).await?;
        if order.status != CustomerOrderStatus::Processing {
            return Ok(());
        }

        let items = self.get_customer_order_items(id).await?;
        let requests = items
            .iter()
            .map(|item| AdjustRequest {
                workstation_id: PLANT_WAREHOUSE,
                item_type: ItemType::Product,
                item_id: item.product_id,
                delta: -(item.quantity as i64),
                reason: AdjustReason::Fulfillment,
                ref_order_type: Some("CustomerOrder".to_string()),
                ref_order_id: Some(id),
                actor: None,
                idempotency_key: Some(format!("CustomerOrder:{id}:complete:{}", item.product_id)),
            })
            .collect();
        self.inventory.adjust_many(requests).await?;

        let now = Utc::now();
        let mut am: customer_order::ActiveModel = order.clone().into();
        am.status = Set(CustomerOrderStatus::Completed);
        am.updated_at = Set(now);
        am.version = Set(order.version + 1);
        am.update(self.db.as_ref()).await.map_err(AppError::database)?;

        let _ = self
            .events
            .send(Event::CustomerOrderStatusChanged {
                order_id: id,
                old_status: "PROCESSING".to_string(),
                new_status: "COMPLETED".to_string(),
            })
            .await;
        Ok(())
    }
}
