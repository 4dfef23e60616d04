pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::resume::handlers::handle_extract_text;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Profile API
        .route(
            "/api/v1/profiles",
            get(handlers::handle_list_profiles).post(handlers::handle_create_profile),
        )
        .route(
            "/api/v1/profiles/:job_title",
            get(handlers::handle_get_profile),
        )
        // Analysis API
        .route("/api/v1/analysis", post(handlers::handle_analyze))
        // Resume API
        .route("/api/v1/resumes/extract", post(handle_extract_text))
        .with_state(state)
}
