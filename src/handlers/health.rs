use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `ok` or `degraded`
    pub status: String,
    /// `connected` or `disconnected`
    pub database: String,
    pub backend: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WelcomeResponse {
    pub message: String,
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Welcome message", body = WelcomeResponse)
    ),
    tag = "Health"
)]
pub async fn welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to the API catalog".to_string(),
    })
}

/// Liveness plus a storage connectivity probe
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and storage are up", body = HealthResponse),
        (status = 503, description = "Storage unreachable", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let backend = state.store.backend().to_string();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
                database: "connected".to_string(),
                backend,
            }),
        ),
        Err(err) => {
            tracing::warn!(backend = %backend, error = %err, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "degraded".to_string(),
                    database: "disconnected".to_string(),
                    backend,
                }),
            )
        }
    }
}
