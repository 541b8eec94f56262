use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    /// `connected` or `disconnected`
    pub storage: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BannerResponse {
    pub message: String,
}

/// Service banner
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is running", body = BannerResponse)
    ),
    tag = "health"
)]
pub async fn root() -> Json<BannerResponse> {
    Json(BannerResponse {
        message: "Rootie Backend API is running!".to_string(),
    })
}

/// Health check endpoint
///
/// Reports the service as healthy and probes the storage backend
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let storage = match state.persist.ping().await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::warn!(error = %e, "Storage health probe failed");
            "disconnected"
        }
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: storage.to_string(),
    })
}
