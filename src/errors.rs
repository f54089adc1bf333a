use axum::{extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse, response::Response, Json};
use chrono::Utc;
use sea_orm::{DbErr, TransactionError};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// The standard error envelope every non-2xx response carries.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub timestamp: chrono::DateTime<Utc>,
    pub status: u16,
    pub error: String,
    pub error_code: String,
    pub message: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// The one closed error type services and handlers return. Every variant maps
/// to exactly one `errorCode` string and HTTP status in `IntoResponse` below.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("order not found: {0}")]
    OrderNotFound(String),

    #[error("invalid order state: {0}")]
    OrderInvalidState(String),

    #[error("invalid operation: {0}")]
    OrderInvalidOperation(String),

    #[error("insufficient stock: {0}")]
    OrderInsufficientStock(String),

    #[error("bom conversion failed: {0}")]
    OrderBomConversionFailed(String),

    #[error("production planning error: {0}")]
    OrderProductionPlanningError(String),

    #[error("inventory key not found: {0}")]
    InventoryNotFound(String),

    #[error("inventory validation error: {0}")]
    InventoryValidationError(String),

    #[error("inventory operation unauthorized: {0}")]
    InventoryUnauthorized(String),

    #[error("master data not found: {0}")]
    MasterDataNotFound(String),

    #[error("user unauthorized: {0}")]
    UserUnauthorized(String),

    #[error("scheduler service error: {0}")]
    SchedulerServiceError(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::OrderNotFound(_) => (StatusCode::NOT_FOUND, "ORDER_NOT_FOUND"),
            AppError::OrderInvalidState(_) => (StatusCode::BAD_REQUEST, "ORDER_INVALID_STATE"),
            AppError::OrderInvalidOperation(_) => (StatusCode::BAD_REQUEST, "ORDER_INVALID_OPERATION"),
            AppError::OrderInsufficientStock(_) => (StatusCode::BAD_REQUEST, "ORDER_INSUFFICIENT_STOCK"),
            AppError::OrderBomConversionFailed(_) => (StatusCode::BAD_REQUEST, "ORDER_BOM_CONVERSION_FAILED"),
            AppError::OrderProductionPlanningError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "ORDER_PRODUCTION_PLANNING_ERROR")
            }
            AppError::InventoryNotFound(_) => (StatusCode::NOT_FOUND, "INVENTORY_NOT_FOUND"),
            AppError::InventoryValidationError(_) => (StatusCode::BAD_REQUEST, "INVENTORY_VALIDATION_ERROR"),
            AppError::InventoryUnauthorized(_) => (StatusCode::FORBIDDEN, "INVENTORY_UNAUTHORIZED"),
            AppError::MasterDataNotFound(_) => (StatusCode::NOT_FOUND, "MASTERDATA_NOT_FOUND"),
            AppError::UserUnauthorized(_) => (StatusCode::FORBIDDEN, "USER_UNAUTHORIZED"),
            AppError::SchedulerServiceError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SIMAL_SERVICE_ERROR"),
            AppError::Database(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }

    pub fn database(err: DbErr) -> Self {
        tracing::error!(error = %err, "database error");
        AppError::Database(err.to_string())
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::database(err)
    }
}

impl From<TransactionError<AppError>> for AppError {
    fn from(err: TransactionError<AppError>) -> Self {
        match err {
            TransactionError::Connection(e) => AppError::database(e),
            TransactionError::Transaction(e) => e,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InventoryValidationError(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(err: JsonRejection) -> Self {
        AppError::InventoryValidationError(err.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();
        let body = ErrorResponse {
            timestamp: Utc::now(),
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            error_code: code.to_string(),
            message: if status == StatusCode::INTERNAL_SERVER_ERROR {
                "an internal error occurred".to_string()
            } else {
                self.to_string()
            },
            path: String::new(),
            details: None,
        };
        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
