use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::adapters::router::OperationCatalog;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub operations: usize,
}

pub struct HealthHandler {
    catalog: Arc<RwLock<OperationCatalog>>,
    start_time: std::time::Instant,
}

impl HealthHandler {
    pub fn new(catalog: Arc<RwLock<OperationCatalog>>) -> Self {
        Self {
            catalog,
            start_time: std::time::Instant::now(),
        }
    }

    /// Basic health check - returns 200 if server is running
    pub async fn health(&self) -> impl IntoResponse {
        let status = HealthStatus {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            operations: self.catalog.read().await.len(),
        };

        (StatusCode::OK, Json(status))
    }

    /// Ready once at least one operation is loaded.
    pub async fn ready(&self) -> impl IntoResponse {
        let count = self.catalog.read().await.len();

        if count > 0 {
            (StatusCode::OK, Json(serde_json::json!({
                "status": "ready",
                "message": format!("Serving {} operation(s)", count)
            })))
        } else {
            (StatusCode::SERVICE_UNAVAILABLE, Json(serde_json::json!({
                "status": "not_ready",
                "message": "No operations loaded"
            })))
        }
    }

    pub async fn live(&self) -> impl IntoResponse {
        (StatusCode::OK, Json(serde_json::json!({
            "status": "alive",
            "message": "Server is alive"
        })))
    }
}
