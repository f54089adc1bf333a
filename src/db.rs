use crate::config::AppConfig;
use crate::errors::AppError;
use metrics::{counter, gauge};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

pub type DbPool = DatabaseConnection;

/// Retry/backoff policy applied to the initial connect attempt.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
        }
    }
}

fn is_retryable_error(err: &DbErr) -> bool {
    match err {
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => true,
        DbErr::Query(runtime_err) => {
            let msg = runtime_err.to_string().to_lowercase();
            msg.contains("connection") || msg.contains("timeout") || msg.contains("broken pipe")
        }
        _ => false,
    }
}

pub async fn with_retry<F, Fut, T>(config: &RetryConfig, operation_name: &str, mut f: F) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    let mut attempts = 0;
    let mut delay = config.initial_delay;

    loop {
        attempts += 1;
        match f().await {
            Ok(result) => {
                if attempts > 1 {
                    info!(operation = %operation_name, attempts, "database operation succeeded after retry");
                    counter!("mes_db.retry.success", 1, "operation" => operation_name.to_string());
                }
                return Ok(result);
            }
            Err(err) => {
                if attempts >= config.max_retries || !is_retryable_error(&err) {
                    error!(operation = %operation_name, attempts, error = %err, "database operation failed");
                    counter!("mes_db.retry.exhausted", 1, "operation" => operation_name.to_string());
                    return Err(err);
                }
                warn!(operation = %operation_name, attempts, delay_ms = delay.as_millis() as u64, error = %err, "retrying database operation");
                counter!("mes_db.retry.attempt", 1, "operation" => operation_name.to_string());
                sleep(delay).await;
                delay = Duration::from_secs_f64(
                    (delay.as_secs_f64() * config.backoff_multiplier).min(config.max_delay.as_secs_f64()),
                );
            }
        }
    }
}

/// Tuning knobs for a connection pool, independent of where they came from.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&AppConfig> for DbConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            url: cfg.database_url.clone(),
            max_connections: cfg.db_max_connections,
            min_connections: cfg.db_min_connections,
            connect_timeout: Duration::from_secs(cfg.db_connect_timeout_secs),
        }
    }
}

pub async fn establish_connection(database_url: &str) -> Result<DbPool, AppError> {
    let config = DbConfig {
        url: database_url.to_string(),
        ..Default::default()
    };
    establish_connection_with_config(&config).await
}

pub async fn establish_connection_with_config(config: &DbConfig) -> Result<DbPool, AppError> {
    debug!(?config, "configuring database connection");

    let mut opt = ConnectOptions::new(config.url.clone());
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout)
        .sqlx_logging(true);

    gauge!("mes_db.max_connections", config.max_connections as f64);

    let retry_config = RetryConfig::default();
    let db_pool = with_retry(&retry_config, "establish_connection", || {
        Database::connect(opt.clone())
    })
    .await
    .map_err(AppError::database)?;

    info!("database connection pool established");
    Ok(db_pool)
}

pub async fn establish_connection_from_app_config(cfg: &AppConfig) -> Result<DbPool, AppError> {
    let db_cfg: DbConfig = cfg.into();
    establish_connection_with_config(&db_cfg).await
}

pub async fn run_migrations(pool: &DbPool) -> Result<(), AppError> {
    info!("running database migrations");
    let start = std::time::Instant::now();

    let result = migrations::Migrator::up(pool, None).await;
    let elapsed = start.elapsed();

    match &result {
        Ok(_) => info!(elapsed = ?elapsed, "database migrations completed"),
        Err(e) => error!(elapsed = ?elapsed, error = %e, "database migrations failed"),
    }

    result.map_err(AppError::database)
}

pub async fn check_connection(pool: &DbPool) -> Result<(), AppError> {
    let start = std::time::Instant::now();
    let result = sea_orm::ConnectionTrait::ping(pool).await.map_err(AppError::database);
    let elapsed = start.elapsed();

    match &result {
        Ok(_) => gauge!("mes_db.connection_latency_ms", elapsed.as_millis() as f64),
        Err(e) => {
            error!(elapsed = ?elapsed, error = %e, "database connection check failed");
            counter!("mes_db.connection_failures", 1);
        }
    }
    result
}
