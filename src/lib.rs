pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod services;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::auth::AuthService;
use crate::services::inventory_ledger::InventoryLedgerService;
use crate::services::master_data::MasterDataService;
use crate::services::orchestrator::OrderOrchestrator;

/// Shared application state. Cheap to clone: every field is either an `Arc`
/// or a service handle that is itself `Arc`-backed internally.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub auth: AuthService,
    pub orchestrator: OrderOrchestrator,
    pub inventory: InventoryLedgerService,
    pub master_data: MasterDataService,
}
