use axum::{Router, routing::get};

use crate::presentation::AppState;
use crate::presentation::http::handlers::health::health_handler;

pub(crate) mod posts;

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .nest("/api/v1", posts::router())
        .with_state(state)
}
