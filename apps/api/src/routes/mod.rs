pub mod health;

use axum::{routing::get, routing::post, Router};

use crate::assistant::handlers as assistant_handlers;
use crate::matching::handlers as matching_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Assistant API
        .route(
            "/api/v1/assistant/query",
            post(assistant_handlers::handle_query),
        )
        .route(
            "/api/v1/assistant/history/clear",
            post(assistant_handlers::handle_clear_history),
        )
        // Matching API
        .route(
            "/api/v1/jobs/match",
            post(matching_handlers::handle_batch_match),
        )
        .route(
            "/api/v1/jobs/score",
            post(matching_handlers::handle_score_job),
        )
        .with_state(state)
}
