//! sixwire relay binary.
//!
//! - WebSocket endpoint: /v1/ws
//! - Landing page: /
//! - Metrics: /metrics

use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};

use sixwire_relay::{app_state, config, router};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cfg = config::load_from_file("sixwire.yaml").expect("config load failed");
    let listen: SocketAddr = cfg
        .relay
        .listen
        .parse()
        .expect("relay.listen must be a valid SocketAddr");

    let state = app_state::AppState::new(cfg);
    let app = router::build_router(state);

    tracing::info!(%listen, "sixwire-relay starting");
    let listener = tokio::net::TcpListener::bind(listen).await.expect("failed to bind");

    axum::serve(listener, app).await.expect("server failed");
}
