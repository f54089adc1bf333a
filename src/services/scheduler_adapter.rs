use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, warn};

use crate::entities::enums::Priority;
use crate::errors::AppError;

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleLineItem {
    pub item_id: i64,
    pub item_name: String,
    pub quantity: i32,
    pub estimated_time_minutes: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleRequest {
    pub order_number: String,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub line_items: Vec<ScheduleLineItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleTask {
    pub task_id: String,
    pub item_id: i64,
    pub quantity: i32,
    pub workstation_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_min: i32,
    pub sequence: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Schedule {
    pub schedule_id: String,
    pub tasks: Vec<ScheduleTask>,
}

/// §4.5 Scheduler Adapter: the only caller of the external scheduling engine
/// (SimAL). Owns bounded retry with exponential backoff. A non-retryable
/// rejection (4xx — SimAL refused the request) surfaces immediately as
/// `SIMAL_SERVICE_ERROR`; retryable transport/5xx failures surface as
/// `ORDER_PRODUCTION_PLANNING_ERROR` only once retries are exhausted.
/// Callers never see transport details either way (§7 propagation policy).
#[derive(Clone)]
pub struct SchedulerAdapter {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl SchedulerAdapter {
    pub fn new(base_url: String, timeout: Duration, max_retries: u32) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client construction failed");
        Self { client, base_url, max_retries }
    }

    #[tracing::instrument(skip(self, request))]
    pub async fn schedule_production(&self, request: &ScheduleRequest) -> Result<Schedule, AppError> {
        let url = format!("{}/schedules", self.base_url);
        let mut attempt = 0u32;
        let mut delay = Duration::from_millis(200);

        loop {
            attempt += 1;
            let result = self.client.post(&url).json(request).send().await;

            match result {
                Ok(response) if response.status().is_success() => {
                    return response
                        .json::<Schedule>()
                        .await
                        .map_err(|e| AppError::OrderProductionPlanningError(format!("malformed schedule response: {e}")));
                }
                Ok(response) => {
                    let status = response.status();
                    if !status.is_server_error() {
                        error!(%status, attempt, "scheduler rejected request");
                        return Err(AppError::SchedulerServiceError(format!("scheduler rejected request: {status}")));
                    }
                    if attempt > self.max_retries {
                        error!(%status, attempt, "scheduler request failed");
                        return Err(AppError::OrderProductionPlanningError(format!(
                            "scheduler returned {status} after {attempt} attempt(s)"
                        )));
                    }
                }
                Err(err) => {
                    if attempt > self.max_retries {
                        error!(error = %err, attempt, "scheduler request exhausted retries");
                        return Err(AppError::OrderProductionPlanningError(format!(
                            "scheduler unreachable after {attempt} attempt(s): {err}"
                        )));
                    }
                    warn!(error = %err, attempt, delay_ms = delay.as_millis() as u64, "retrying scheduler request");
                }
            }

            tokio::time::sleep(delay).await;
            delay *= 2;
        }
    }
}
