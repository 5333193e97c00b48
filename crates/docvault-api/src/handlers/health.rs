//! Health check handler.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

/// Component health report.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
    pub cache: String,
    pub kill_switch: bool,
}

/// GET /healthz
pub async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.db.health_check().await {
        Ok(true) => "up",
        _ => "down",
    };
    let cache = match state.cache.health_check().await {
        Ok(()) => "up",
        Err(_) => "down",
    };
    let kill_switch = state.config.access.kill_switch;

    let status = if database == "up" && cache == "up" && !kill_switch {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
        cache: cache.to_string(),
        kill_switch,
    })
}
