use axum::extract::State;
use serde::Serialize;

use crate::app::AppState;
use crate::middleware::ApiResponse;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub backend: &'static str,
}

/// GET /health - the edge is healthy whenever it answers; backend reachability is reported alongside
pub async fn health(State(state): State<AppState>) -> ApiResponse<HealthReport> {
    let backend = match state
        .http
        .get(&state.config.api.base_url)
        .timeout(state.config.health_timeout())
        .send()
        .await
    {
        Ok(response) if response.status().is_server_error() => "degraded",
        Ok(_) => "ok",
        Err(e) => {
            tracing::warn!("Backend health probe failed: {}", e);
            "unreachable"
        }
    };

    ApiResponse::success(HealthReport {
        status: "ok",
        timestamp: chrono::Utc::now(),
        backend,
    })
}
