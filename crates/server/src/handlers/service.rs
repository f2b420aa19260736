//! Service discovery and health endpoints.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use serde::Serialize;

/// Root response.
#[derive(Debug, Serialize)]
pub struct WelcomeResponse {
    pub message: &'static str,
    pub version: &'static str,
}

/// GET / - Service banner.
pub async fn root() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to ClientPulse API",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub s3: &'static str,
}

/// GET /health - Health check.
///
/// Unauthenticated so load balancers and probes can reach it. Reports only
/// whether the database answered and whether screenshot storage is enabled.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    if let Err(e) = state.metadata.health_check().await {
        tracing::error!(error = %e, "Database health check failed");
        return Err(ApiError::ServiceUnavailable(
            "Database unavailable".to_string(),
        ));
    }

    Ok(Json(HealthResponse {
        status: "healthy",
        database: "connected",
        s3: if state.screenshots.is_enabled() {
            "enabled"
        } else {
            "disabled"
        },
    }))
}
