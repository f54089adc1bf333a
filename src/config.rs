use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationError};

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_PROFILE: &str = "dev";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_LOT_SIZE_THRESHOLD: i32 = 3;
const DEFAULT_OUTBOUND_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_MASTER_DATA_CACHE_TTL_SECS: u64 = 600;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 16;
const DEFAULT_DB_MIN_CONNECTIONS: u32 = 2;
const DEFAULT_DB_CONNECT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SCHEDULER_MAX_RETRIES: u32 = 3;

/// Process-wide configuration, loaded from the environment via the
/// `APP__` prefix (e.g. `APP__PORT`, `APP__JWT_SECRET`).
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database connection URL. `sqlite::memory:` in tests, Postgres in prod.
    pub database_url: String,

    /// HMAC signing secret for JWTs. Must be at least 32 characters (§6).
    #[validate(length(min = 32), custom = "validate_jwt_secret")]
    pub jwt_secret: String,

    /// JWT expiration in seconds.
    #[serde(default = "default_jwt_expiration_secs")]
    pub jwt_expiration_secs: i64,

    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// `dev | prod | cloud`.
    #[serde(default = "default_profile")]
    #[validate(custom = "validate_profile")]
    pub profile: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_json: bool,

    #[serde(default)]
    pub auto_migrate: bool,

    /// Default lot-size threshold used by the Scenario Selector (§4.2),
    /// overridable per environment; individual requests may still override
    /// this per the spec's `LOT_SIZE_THRESHOLD` system configuration row.
    #[serde(default = "default_lot_size_threshold")]
    pub lot_size_threshold: i32,

    /// Timeout, in milliseconds, applied to every outbound call made by the
    /// Scheduler Adapter.
    #[serde(default = "default_outbound_timeout_ms")]
    pub outbound_timeout_ms: u64,

    #[serde(default = "default_scheduler_max_retries")]
    pub scheduler_max_retries: u32,

    pub scheduler_base_url: String,

    #[serde(default = "default_master_data_cache_ttl_secs")]
    pub master_data_cache_ttl_secs: u64,

    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,
    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppConfigError> {
        let config = Config::builder()
            .set_default("port", DEFAULT_PORT as i64)?
            .set_default("profile", DEFAULT_PROFILE)?
            .set_default("log_level", DEFAULT_LOG_LEVEL)?
            .set_default("jwt_expiration_secs", default_jwt_expiration_secs())?
            .set_default("lot_size_threshold", DEFAULT_LOT_SIZE_THRESHOLD as i64)?
            .set_default("outbound_timeout_ms", DEFAULT_OUTBOUND_TIMEOUT_MS as i64)?
            .set_default("scheduler_max_retries", DEFAULT_SCHEDULER_MAX_RETRIES as i64)?
            .set_default("master_data_cache_ttl_secs", DEFAULT_MASTER_DATA_CACHE_TTL_SECS as i64)?
            .set_default("db_max_connections", DEFAULT_DB_MAX_CONNECTIONS as i64)?
            .set_default("db_min_connections", DEFAULT_DB_MIN_CONNECTIONS as i64)?
            .set_default("db_connect_timeout_secs", DEFAULT_DB_CONNECT_TIMEOUT_SECS as i64)?
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;
        app_config.validate().map_err(AppConfigError::from)?;
        Ok(app_config)
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_profile() -> String {
    DEFAULT_PROFILE.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_jwt_expiration_secs() -> i64 {
    3600
}

fn default_lot_size_threshold() -> i32 {
    DEFAULT_LOT_SIZE_THRESHOLD
}

fn default_outbound_timeout_ms() -> u64 {
    DEFAULT_OUTBOUND_TIMEOUT_MS
}

fn default_scheduler_max_retries() -> u32 {
    DEFAULT_SCHEDULER_MAX_RETRIES
}

fn default_master_data_cache_ttl_secs() -> u64 {
    DEFAULT_MASTER_DATA_CACHE_TTL_SECS
}

fn default_db_max_connections() -> u32 {
    DEFAULT_DB_MAX_CONNECTIONS
}

fn default_db_min_connections() -> u32 {
    DEFAULT_DB_MIN_CONNECTIONS
}

fn default_db_connect_timeout_secs() -> u64 {
    DEFAULT_DB_CONNECT_TIMEOUT_SECS
}

fn validate_jwt_secret(secret: &str) -> Result<(), ValidationError> {
    let trimmed = secret.trim();
    if trimmed.len() < 32 {
        let mut err = ValidationError::new("jwt_secret");
        err.message = Some("JWT secret must be at least 32 characters".into());
        return Err(err);
    }

    const DISALLOWED: [&str; 3] = ["CHANGE_THIS_SECRET", "your-secret-key", "default-secret-key"];
    if DISALLOWED.iter().any(|&bad| trimmed.eq_ignore_ascii_case(bad)) {
        let mut err = ValidationError::new("jwt_secret");
        err.message = Some("JWT secret must be overridden with a secure random value".into());
        return Err(err);
    }

    Ok(())
}

fn validate_profile(profile: &str) -> Result<(), ValidationError> {
    if matches!(profile, "dev" | "prod" | "cloud") {
        Ok(())
    } else {
        let mut err = ValidationError::new("profile");
        err.message = Some("profile must be one of: dev, prod, cloud".into());
        Err(err)
    }
}

/// Initializes the global `tracing` subscriber. JSON output when `json` is
/// true (cloud/prod profiles), human-readable otherwise.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default_directive = format!("mes_api={level},tower_http=info");
    let filter = std::env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer())
            .try_init();
    }
}
