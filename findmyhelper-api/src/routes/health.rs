/// Health check endpoint
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "backend": "postgres",
///   "storage": "available"
/// }
/// ```
use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Application version
    pub version: String,

    /// Selected storage backend
    pub backend: String,

    /// Storage reachability
    pub storage: String,
}

/// Health check handler
///
/// Probes the store with a cheap read so a dead database shows up as
/// `degraded` rather than a healthy lie.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let storage = match state.store.list_categories().await {
        Ok(_) => "available",
        Err(_) => "unavailable",
    };

    Ok(Json(HealthResponse {
        status: if storage == "available" {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.store.backend().as_str().to_string(),
        storage: storage.to_string(),
    }))
}
