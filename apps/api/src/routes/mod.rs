pub mod health;
pub mod twin;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::health_handler))
        .route("/health", get(health::health_handler))
        .route("/api/state", get(twin::handle_get_state))
        .route("/api/upload_resume", post(twin::handle_upload_resume))
        .route("/api/connect_github", post(twin::handle_connect_github))
        .route(
            "/api/sync_from_main_app",
            post(twin::handle_sync_from_main_app),
        )
        .route("/api/simulate", post(twin::handle_simulate))
        .route("/api/reset", post(twin::handle_reset))
        .route("/api/set_name", post(twin::handle_set_name))
        .with_state(state)
}
