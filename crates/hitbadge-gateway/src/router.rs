//! Axum router wiring.

use axum::{routing::get, Router};

use crate::{app_state::AppState, ops, transport};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api", get(ops::api_index))
        .route("/api/count/incr/badge.svg", get(transport::badge::incr_badge))
        .route("/api/count/keep/badge.svg", get(transport::badge::keep_badge))
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics))
        .with_state(state)
}
