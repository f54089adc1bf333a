use axum::{
    extract::{Path, State},
    routing::{post, put},
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::entities::enums::UserRole;
use crate::errors::AppError;
use crate::services::orchestrator::{CreateCustomerOrderRequest, CustomerOrderView, ProductionOrderView, WarehouseOrderView};

use super::AppState;

#[derive(Debug, Serialize)]
struct Ack {
    status: &'static str,
}

fn ack() -> Json<Ack> {
    Json(Ack { status: "ok" })
}

fn require_role(user: &AuthUser, allowed: &[UserRole]) -> Result<(), AppError> {
    if user.is_admin() || allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(AppError::UserUnauthorized(format!("role {:?} may not perform this operation", user.role)))
    }
}

// --- Customer orders ---------------------------------------------------

async fn create_customer_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateCustomerOrderRequest>,
) -> Result<Json<CustomerOrderView>, AppError> {
    require_role(&user, &[UserRole::WarehouseOperator])?;
    Ok(Json(state.orchestrator.create_customer_order(request).await?))
}

async fn confirm_customer_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CustomerOrderView>, AppError> {
    require_role(&user, &[UserRole::WarehouseOperator])?;
    Ok(Json(state.orchestrator.confirm_customer_order(id).await?))
}

async fn fulfill_customer_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CustomerOrderView>, AppError> {
    require_role(&user, &[UserRole::WarehouseOperator])?;
    Ok(Json(state.orchestrator.fulfill_customer_order(id).await?))
}

// --- Warehouse orders ----------------------------------------------------

async fn confirm_warehouse_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<WarehouseOrderView>, AppError> {
    require_role(&user, &[UserRole::WarehouseOperator])?;
    Ok(Json(state.orchestrator.confirm_warehouse_order(id).await?))
}

async fn fulfill_warehouse_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<WarehouseOrderView>, AppError> {
    require_role(&user, &[UserRole::WarehouseOperator])?;
    Ok(Json(state.orchestrator.fulfill_warehouse_order(id).await?))
}

#[derive(Debug, Serialize)]
struct ProductionOrderIdResponse {
    production_order_id: Uuid,
}

async fn order_production_from_warehouse(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductionOrderIdResponse>, AppError> {
    require_role(&user, &[UserRole::WarehouseOperator])?;
    let production_order_id = state.orchestrator.order_production_from_warehouse(id).await?;
    Ok(Json(ProductionOrderIdResponse { production_order_id }))
}

// --- Production orders ----------------------------------------------------

async fn schedule_production(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductionOrderView>, AppError> {
    require_role(&user, &[])?;
    Ok(Json(state.orchestrator.schedule_production(id).await?))
}

// --- Control orders ----------------------------------------------------

async fn dispatch_control_order(State(state): State<AppState>, user: AuthUser, Path(id): Path<Uuid>) -> Result<Json<Ack>, AppError> {
    require_role(&user, &[UserRole::ManufacturingOperator, UserRole::AssemblyOperator])?;
    state.orchestrator.dispatch_control_order(id).await?;
    Ok(ack())
}

// --- Supply orders ----------------------------------------------------

async fn fulfill_supply_order(State(state): State<AppState>, user: AuthUser, Path(id): Path<Uuid>) -> Result<Json<Ack>, AppError> {
    require_role(&user, &[UserRole::ManufacturingOperator, UserRole::AssemblyOperator])?;
    state.orchestrator.fulfill_supply_order(id).await?;
    Ok(ack())
}

async fn reject_supply_order(State(state): State<AppState>, user: AuthUser, Path(id): Path<Uuid>) -> Result<Json<Ack>, AppError> {
    require_role(&user, &[UserRole::ManufacturingOperator, UserRole::AssemblyOperator])?;
    state.orchestrator.reject_supply_order(id).await?;
    Ok(ack())
}

// --- Workstation orders ----------------------------------------------------

async fn start_workstation_order(State(state): State<AppState>, user: AuthUser, Path(id): Path<Uuid>) -> Result<Json<Ack>, AppError> {
    require_role(&user, &[UserRole::ManufacturingOperator, UserRole::AssemblyOperator])?;
    state.orchestrator.start_workstation_order(id).await?;
    Ok(ack())
}

async fn complete_workstation_order(State(state): State<AppState>, user: AuthUser, Path(id): Path<Uuid>) -> Result<Json<Ack>, AppError> {
    require_role(&user, &[UserRole::ManufacturingOperator, UserRole::AssemblyOperator])?;
    state.orchestrator.complete_workstation_order(id).await?;
    Ok(ack())
}

// --- Final assembly orders ----------------------------------------------------

async fn submit_final_assembly_order(State(state): State<AppState>, user: AuthUser, Path(id): Path<Uuid>) -> Result<Json<Ack>, AppError> {
    require_role(&user, &[UserRole::AssemblyOperator])?;
    state.orchestrator.submit_final_assembly_order(id).await?;
    Ok(ack())
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customer-orders", post(create_customer_order))
        .route("/customer-orders/:id/confirm", put(confirm_customer_order))
        .route("/customer-orders/:id/fulfill", post(fulfill_customer_order))
        .route("/warehouse-orders/:id/confirm", put(confirm_warehouse_order))
        .route("/warehouse-orders/:id/fulfill", post(fulfill_warehouse_order))
        .route("/warehouse-orders/:id/order-production", post(order_production_from_warehouse))
        .route("/production-orders/:id/schedule", post(schedule_production))
        .route("/control-orders/:id/dispatch", post(dispatch_control_order))
        .route("/supply-orders/:id/fulfill", post(fulfill_supply_order))
        .route("/supply-orders/:id/reject", post(reject_supply_order))
        .route("/workstation-orders/:id/start", post(start_workstation_order))
        .route("/workstation-orders/:id/complete", post(complete_workstation_order))
        .route("/final-assembly-orders/:id/submit", post(submit_final_assembly_order))
}
