use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use mes_api::auth::{AuthService, Claims};
use mes_api::config::AppConfig;
use mes_api::db;
use mes_api::entities::enums::{ItemType, UserRole, WorkstationRole};
use mes_api::entities::{bom_edge, module, part, product, stock_record, workstation};
use mes_api::events::spawn_event_logger;
use mes_api::handlers::{auth, health, inventory, masterdata, orders};
use mes_api::services::bom_resolver::BomResolver;
use mes_api::services::inventory_ledger::InventoryLedgerService;
use mes_api::services::master_data::MasterDataService;
use mes_api::services::orchestrator::OrderOrchestrator;
use mes_api::services::scheduler_adapter::SchedulerAdapter;
use mes_api::AppState;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

const TEST_JWT_SECRET: &str = "test-secret-at-least-32-characters-long!!";

/// Test harness: an in-memory SQLite-backed application with every workstation
/// seeded, an admin bearer token, and the full router wired exactly as
/// `main.rs` wires it.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    token: String,
    _event_logger: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        let cfg = AppConfig {
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: TEST_JWT_SECRET.to_string(),
            jwt_expiration_secs: 3600,
            host: "127.0.0.1".to_string(),
            port: 0,
            profile: "dev".to_string(),
            log_level: "info".to_string(),
            log_json: false,
            auto_migrate: true,
            lot_size_threshold: 3,
            outbound_timeout_ms: 2_000,
            scheduler_max_retries: 1,
            scheduler_base_url: "http://127.0.0.1:0".to_string(),
            master_data_cache_ttl_secs: 600,
            db_max_connections: 1,
            db_min_connections: 1,
            db_connect_timeout_secs: 5,
        };

        let pool = db::establish_connection_from_app_config(&cfg).await.expect("connect test db");
        db::run_migrations(&pool).await.expect("run test migrations");
        let db_arc = Arc::new(pool);

        seed_workstations(&db_arc).await;

        let cache_ttl = Duration::from_secs(cfg.master_data_cache_ttl_secs);
        let master_data = MasterDataService::new(db_arc.clone(), cache_ttl);
        let bom = BomResolver::new(db_arc.clone(), cache_ttl);
        let (events, event_logger) = spawn_event_logger(256);
        let inventory = InventoryLedgerService::new(db_arc.clone(), events.clone());
        let scheduler = SchedulerAdapter::new(cfg.scheduler_base_url.clone(), Duration::from_millis(cfg.outbound_timeout_ms), cfg.scheduler_max_retries);
        let orchestrator = OrderOrchestrator::new(
            db_arc.clone(),
            inventory.clone(),
            master_data.clone(),
            bom,
            scheduler,
            events,
            cfg.lot_size_threshold,
        );
        let auth_service = AuthService::new(cfg.jwt_secret.clone(), cfg.jwt_expiration_secs, db_arc.clone());

        let state = AppState { db: db_arc, auth: auth_service, orchestrator, inventory, master_data };

        let router = Router::new()
            .merge(health::routes())
            .merge(auth::routes())
            .merge(masterdata::routes())
            .merge(inventory::routes())
            .merge(orders::routes())
            .with_state(state.clone());

        let token = mint_admin_token();

        Self { router, state, token, _event_logger: event_logger }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri).header("authorization", format!("Bearer {}", self.token));

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("serialize request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("build request");
        self.router.clone().oneshot(request).await.expect("router error during test request")
    }

    pub async fn json_body(response: axum::response::Response) -> Value {
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("read body");
        serde_json::from_slice(&bytes).unwrap_or_else(|e| panic!("response body (status {status}) was not JSON: {e}"))
    }

    pub async fn seed_stock(&self, workstation_id: i32, item_type: ItemType, item_id: i64, quantity: i64) {
        let am = stock_record::ActiveModel {
            id: Set(Uuid::new_v4()),
            workstation_id: Set(workstation_id),
            item_type: Set(item_type),
            item_id: Set(item_id),
            quantity: Set(quantity),
            last_updated: Set(Utc::now()),
        };
        am.insert(self.state.db.as_ref()).await.expect("seed stock");
    }

    pub async fn seed_product(&self, id: i64, name: &str) {
        let am = product::ActiveModel { id: Set(id), name: Set(name.to_string()), created_at: Set(Utc::now()) };
        am.insert(self.state.db.as_ref()).await.expect("seed product");
    }

    pub async fn seed_module(&self, id: i64, name: &str, production_workstation_id: i32) {
        let am = module::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            production_workstation_id: Set(production_workstation_id),
            created_at: Set(Utc::now()),
        };
        am.insert(self.state.db.as_ref()).await.expect("seed module");
    }

    pub async fn seed_part(&self, id: i64, name: &str) {
        let am = part::ActiveModel { id: Set(id), name: Set(name.to_string()), created_at: Set(Utc::now()) };
        am.insert(self.state.db.as_ref()).await.expect("seed part");
    }

    pub async fn seed_bom_edge(&self, parent_type: ItemType, parent_id: i64, child_type: ItemType, child_id: i64, quantity: i32) {
        let am = bom_edge::ActiveModel {
            id: Set(Uuid::new_v4()),
            parent_type: Set(parent_type),
            parent_id: Set(parent_id),
            child_type: Set(child_type),
            child_id: Set(child_id),
            quantity: Set(quantity),
        };
        am.insert(self.state.db.as_ref()).await.expect("seed bom edge");
    }
}

async fn seed_workstations(db: &sea_orm::DatabaseConnection) {
    let stations: [(i32, WorkstationRole, &str); 9] = [
        (1, WorkstationRole::Manufacturing, "Injection Molding"),
        (2, WorkstationRole::Manufacturing, "Parts Pre-Production"),
        (3, WorkstationRole::Manufacturing, "Part Finishing"),
        (4, WorkstationRole::Assembly, "Gear Assembly"),
        (5, WorkstationRole::Assembly, "Motor Assembly"),
        (6, WorkstationRole::Assembly, "Final Assembly"),
        (7, WorkstationRole::Warehouse, "Plant Warehouse"),
        (8, WorkstationRole::Warehouse, "Modules Supermarket"),
        (9, WorkstationRole::Warehouse, "Parts Supply"),
    ];
    for (id, role, name) in stations {
        let am = workstation::ActiveModel { id: Set(id), role: Set(role), name: Set(name.to_string()) };
        am.insert(db).await.expect("seed workstation");
    }
}

fn mint_admin_token() -> String {
    let now = Utc::now();
    let claims = Claims {
        sub: Uuid::new_v4().to_string(),
        username: "admin".to_string(),
        role: UserRole::Admin,
        workstation_id: None,
        iat: now.timestamp(),
        exp: (now + chrono::Duration::hours(1)).timestamp(),
    };
    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes())).expect("encode test token")
}
