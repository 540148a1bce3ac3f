use axum::{extract::State, http::StatusCode, Json};

use crate::api::dto::HealthResponse;
use crate::state::AppState;

/// Liveness and storage-reachability probe.
pub async fn health(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let response = HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        storage: state.storage_kind,
    };

    match state.link_service.ping_store().await {
        Ok(()) => Ok(Json(response)),
        Err(err) => {
            tracing::warn!(error = %err, "health check failed to reach storage");
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "degraded",
                    ..response
                }),
            ))
        }
    }
}
