pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::screening::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/ping", get(health::ping_handler))
        .route("/health", get(health::health_handler))
        .route("/screen", post(handlers::handle_screen))
        .route("/batch_screen", post(handlers::handle_batch_screen))
        .route("/recommend", post(handlers::handle_recommend))
        .layer(body_limit)
        .with_state(state)
}
