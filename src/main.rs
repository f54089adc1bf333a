use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use mes_api::auth::AuthService;
use mes_api::config::{self, AppConfig};
use mes_api::db;
use mes_api::events::spawn_event_logger;
use mes_api::handlers::{auth, health, inventory, masterdata, orders};
use mes_api::services::bom_resolver::BomResolver;
use mes_api::services::inventory_ledger::InventoryLedgerService;
use mes_api::services::master_data::MasterDataService;
use mes_api::services::orchestrator::OrderOrchestrator;
use mes_api::services::scheduler_adapter::SchedulerAdapter;
use mes_api::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();
    let cfg = AppConfig::from_env()?;
    config::init_tracing(&cfg.log_level, cfg.log_json);

    tracing::info!(profile = %cfg.profile, port = cfg.port, "starting mes-api");

    let db_conn = Arc::new(db::establish_connection_from_app_config(&cfg).await?);
    if cfg.auto_migrate {
        db::run_migrations(&db_conn).await?;
    }

    let cache_ttl = Duration::from_secs(cfg.master_data_cache_ttl_secs);
    let master_data = MasterDataService::new(db_conn.clone(), cache_ttl);
    let bom = BomResolver::new(db_conn.clone(), cache_ttl);
    let (events, _event_logger) = spawn_event_logger(1024);
    let inventory = InventoryLedgerService::new(db_conn.clone(), events.clone());
    let scheduler = SchedulerAdapter::new(
        cfg.scheduler_base_url.clone(),
        Duration::from_millis(cfg.outbound_timeout_ms),
        cfg.scheduler_max_retries,
    );
    let orchestrator = OrderOrchestrator::new(
        db_conn.clone(),
        inventory.clone(),
        master_data.clone(),
        bom,
        scheduler,
        events,
        cfg.lot_size_threshold,
    );
    let auth_service = AuthService::new(cfg.jwt_secret.clone(), cfg.jwt_expiration_secs, db_conn.clone());

    let state = AppState { db: db_conn, auth: auth_service, orchestrator, inventory, master_data };

    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TimeoutLayer::new(Duration::from_millis(cfg.outbound_timeout_ms)));

    let app = Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(masterdata::routes())
        .merge(inventory::routes())
        .merge(orders::routes())
        .layer(middleware)
        .with_state(state);

    let addr = format!("{}:{}", cfg.host, cfg.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
