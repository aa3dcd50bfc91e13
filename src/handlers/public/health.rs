// handlers/public/health.rs - GET /health handler

use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthView {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}

pub async fn health(State(state): State<AppState>) -> ApiResult<HealthView> {
    if let Err(e) = state.store.health_check().await {
        tracing::warn!("Health check failed: {}", e);
        return Err(ApiError::service_unavailable("database unavailable"));
    }

    Ok(ApiResponse::success(
        "ok",
        HealthView {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
            timestamp: Utc::now(),
        },
    ))
}
