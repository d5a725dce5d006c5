//! The HTTP gateway: the one user-facing move endpoint, the learning and
//! coaching endpoints, and read-only admin observability. Everything here
//! is a thin translation layer — the actual chess and learning logic lives
//! in `wall-e-edge` and `wall-e-learning`.

mod admin;
mod chat;
mod chess_move;
mod config;
mod error;
mod headers;
mod learning;
mod metrics_endpoint;
mod mistakes;
mod state;

pub use config::Config;
pub use state::AppState;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

/// Assemble the full gateway router. Admin routes sit behind a bearer-auth
/// layer scoped to just that sub-router; everything else is open, matching
/// the "single shared bearer for admin, nothing else" scope this gateway
/// was built to.
pub fn router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/worker-health", get(admin::worker_health))
        .route("/worker-calls", get(admin::worker_calls))
        .route("/learning-health", get(admin::learning_health))
        .route("/learning-recent", get(admin::learning_recent))
        .layer(middleware::from_fn_with_state(state.clone(), admin::require_admin_auth));

    Router::new()
        .route("/api/chess-move", post(chess_move::chess_move))
        .route("/api/learning/ingest-game", post(learning::ingest_game))
        .route("/api/learning/progress", get(learning::progress))
        .route(
            "/api/wall-e/mistakes",
            post(mistakes::upsert_mistake).get(mistakes::list_mistakes),
        )
        .route(
            "/api/wall-e/metrics",
            post(metrics_endpoint::append_metric).get(metrics_endpoint::read_metrics),
        )
        .route("/api/wall-e/chat", post(chat::chat))
        .nest("/api/admin", admin_routes)
        .with_state(state)
}
