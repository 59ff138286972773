use super::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    database_connected: bool,
    image_store: &'static str,
    uptime_seconds: u64,
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let database_connected = state.schools.ping().await;

    Json(HealthResponse {
        status: if database_connected {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        database_connected,
        image_store: state.images.kind(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}
