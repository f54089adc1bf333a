use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::entities::enums::{AdjustReason, ItemType};
use crate::entities::stock_record;
use crate::errors::AppError;
use crate::services::inventory_ledger::StockFilter;

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct StockQuery {
    pub workstation_id: Option<i32>,
    pub item_type: Option<ItemType>,
    pub item_id: Option<i64>,
}

async fn list_stock(State(state): State<AppState>, Query(query): Query<StockQuery>) -> Result<Json<Vec<stock_record::Model>>, AppError> {
    let filter = StockFilter { workstation_id: query.workstation_id, item_type: query.item_type, item_id: query.item_id };
    Ok(Json(state.inventory.get_stock(filter).await?))
}

#[derive(Debug, Deserialize)]
pub struct AlertsQuery {
    #[serde(default = "default_alert_threshold")]
    pub threshold: i64,
}

fn default_alert_threshold() -> i64 {
    0
}

async fn list_alerts(State(state): State<AppState>, Query(query): Query<AlertsQuery>) -> Result<Json<Vec<stock_record::Model>>, AppError> {
    Ok(Json(state.inventory.list_alerts(query.threshold).await?))
}

#[derive(Debug, Deserialize)]
pub struct AdjustStockRequest {
    pub workstation_id: i32,
    pub item_type: ItemType,
    pub item_id: i64,
    pub delta: i64,
    pub reason: AdjustReason,
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AdjustStockResponse {
    pub record: stock_record::Model,
}

/// Manual stock correction, restricted to admins and to operators scoped to
/// the affected workstation per `AuthUser::may_act_at`.
async fn adjust_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<AdjustStockRequest>,
) -> Result<Json<AdjustStockResponse>, AppError> {
    if !user.may_act_at(request.workstation_id) {
        return Err(AppError::InventoryUnauthorized(format!(
            "user {} is not scoped to workstation {}",
            user.username, request.workstation_id
        )));
    }

    let record = state
        .inventory
        .adjust(
            request.workstation_id,
            request.item_type,
            request.item_id,
            request.delta,
            request.reason,
            Some("ManualAdjustment".to_string()),
            None::<Uuid>,
            Some(user.username.clone()),
            request.idempotency_key,
        )
        .await?;
    Ok(Json(AdjustStockResponse { record }))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stock", get(list_stock))
        .route("/stock/alerts", get(list_alerts))
        .route("/stock/adjust", post(adjust_stock))
}
