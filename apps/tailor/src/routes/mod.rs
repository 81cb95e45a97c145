pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::tailoring::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Tailoring API
        .route("/api/v1/tailor", post(handlers::handle_tailor))
        .route("/api/v1/validate", post(handlers::handle_validate))
        .route("/api/v1/render", post(handlers::handle_render))
        .with_state(state)
}
