use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use super::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct ReadinessResponse {
    status: &'static str,
    database: &'static str,
}

async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn readiness(State(state): State<AppState>) -> Json<ReadinessResponse> {
    match crate::db::check_connection(state.db.as_ref()).await {
        Ok(()) => Json(ReadinessResponse { status: "ok", database: "ok" }),
        Err(_) => Json(ReadinessResponse { status: "degraded", database: "unreachable" }),
    }
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/health/live", get(liveness)).route("/health/ready", get(readiness))
}
