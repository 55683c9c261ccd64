// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition, service index, health and API documentation.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::middleware::ApiResponse;

pub mod auth;
pub mod docs;

/// GET / - Service index
pub async fn root() -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "name": "Payments API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Payment debt records and CSV upload normalization",
        "endpoints": {
            "payment-debt": "/payment-debt/",
            "csv-files-upload": "/csv-files-upload/",
            "auth": "/auth/login/, /auth/refresh/ (public - token acquisition)",
            "health": "/health (public)",
        },
        "documentation": {
            "openapi": "/openapi/",
            "docs": "/docs/",
        }
    }))
}

/// GET /health - Liveness plus a database ping
pub async fn health(State(state): State<AppState>) -> Response {
    let now = chrono::Utc::now();

    match state.debts.ping().await {
        Ok(()) => ApiResponse::success(json!({
            "status": "ok",
            "timestamp": now,
            "database": "ok",
            "storage": state.storage.backend_name(),
        }))
        .into_response(),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": true,
                    "message": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "database": "unavailable",
                        "storage": state.storage.backend_name(),
                    }
                })),
            )
                .into_response()
        }
    }
}
