mod health;
mod schools;

pub use health::health_check;
pub use schools::{add_school, get_schools};

use crate::db::SchoolStore;
use crate::storage::ImageStore;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

/// Shared handler state: the two stores plus the start time for uptime.
pub struct AppState {
    pub schools: Arc<dyn SchoolStore>,
    pub images: Arc<dyn ImageStore>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(schools: Arc<dyn SchoolStore>, images: Arc<dyn ImageStore>) -> Self {
        Self {
            schools,
            images,
            started_at: Instant::now(),
        }
    }
}

/// The API routes, without static file serving.
pub fn router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/addSchool", post(add_school))
        .route("/api/getSchools", get(get_schools))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
