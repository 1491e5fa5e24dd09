//! Axum route wiring (HTTP -> WS upgrade, landing page, metrics).

use axum::{extract::State, routing::get, Router};

use crate::{app_state::AppState, transport};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/metrics", get(metrics))
        .route("/v1/ws", get(transport::ws::ws_upgrade))
        .with_state(state)
}

/// Informational landing body for health-check style probes.
async fn root() -> &'static str {
    "sixwire relay\n"
}

async fn metrics(State(app): State<AppState>) -> String {
    app.metrics().render()
}
