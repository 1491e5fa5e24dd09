//! WebSocket handler.
//!
//! Responsibilities:
//! - Upgrade HTTP -> WS
//! - Lifecycle: ping/pong + idle timeout
//! - Decode each text frame into a command envelope
//! - Register the sender on identified inbound traffic, then dispatch
//! - Deregister on disconnect
//!
//! Each inbound frame runs to completion (decode, register, dispatch) before
//! the next is read, so registry mutation and routing never interleave within
//! a session.

use axum::{
    extract::{ws::Message, ws::WebSocket, ws::WebSocketUpgrade, State},
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};

use sixwire_core::protocol::envelope::CommandEnvelope;

use crate::app_state::AppState;
use crate::relay::Connection;

pub async fn ws_upgrade(State(app): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_session(app, socket))
}

async fn run_session(app: AppState, socket: WebSocket) {
    let session_id = app.registry().issue_session_id();
    let (out_tx, mut out_rx) = mpsc::channel::<Message>(1024);
    let (mut ws_tx, mut ws_rx) = socket.split();

    let relay_cfg = &app.cfg().relay;
    let idle_timeout = Duration::from_millis(relay_cfg.idle_timeout_ms);
    let max_frame_bytes = relay_cfg.max_frame_bytes;

    let mut ping_tick =
        tokio::time::interval(Duration::from_millis(relay_cfg.ping_interval_ms));
    ping_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let mut last_activity = Instant::now();

    app.metrics().sessions_active.inc(&[]);
    tracing::debug!(session_id, "session opened");

    loop {
        tokio::select! {
            // outbound writer
            maybe_out = out_rx.recv() => {
                match maybe_out {
                    Some(m) => {
                        if ws_tx.send(m).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }

            // inbound reader
            incoming = ws_rx.next() => {
                let Some(Ok(msg)) = incoming else { break; };
                last_activity = Instant::now();

                match msg {
                    Message::Text(text) => {
                        if text.len() > max_frame_bytes {
                            tracing::warn!(session_id, len = text.len(), "oversized frame dropped");
                            app.metrics().dropped.inc(&[("reason", "oversized_frame")]);
                            continue;
                        }
                        let env: CommandEnvelope = match serde_json::from_str(&text) {
                            Ok(env) => env,
                            Err(e) => {
                                tracing::warn!(session_id, error = %e, "envelope decode failed");
                                app.metrics().decode_errors.inc(&[]);
                                continue;
                            }
                        };
                        log_envelope(session_id, &env);

                        // identified traffic pins the sender's current session
                        if let Some(device_id) =
                            env.device_id.as_deref().filter(|id| !id.is_empty())
                        {
                            app.registry().register(
                                device_id,
                                Connection { session_id, tx: out_tx.clone() },
                            );
                        }

                        app.router().dispatch(&env);
                    }
                    Message::Binary(_) => {
                        tracing::debug!(session_id, "binary frame ignored");
                    }
                    Message::Ping(payload) => {
                        let _ = out_tx.send(Message::Pong(payload)).await;
                    }
                    Message::Pong(_) => {}
                    Message::Close(_) => break,
                }
            }

            // ping
            _ = ping_tick.tick() => {
                let _ = out_tx.send(Message::Ping(Vec::new())).await;
            }

            // idle timeout
            _ = tokio::time::sleep(Duration::from_millis(250)) => {
                if last_activity.elapsed() >= idle_timeout {
                    tracing::debug!(session_id, "idle timeout");
                    break;
                }
            }
        }
    }

    app.metrics().sessions_active.dec(&[]);
    app.registry().unregister_by_session(session_id);
    tracing::debug!(session_id, "session closed");
}

fn log_envelope(session_id: u64, env: &CommandEnvelope) {
    tracing::debug!(
        session_id,
        device_id = env.device_id.as_deref().unwrap_or_default(),
        origin_device_id = env.origin_device_id.as_deref().unwrap_or_default(),
        command = env.command.as_deref().unwrap_or_default(),
        specific = env.specific.as_deref().unwrap_or_default(),
        receivers = env.receivers.as_deref().map(|r| r.len()).unwrap_or(0),
        depth = ?env.current_search_depth,
        search_path = ?env.search_path_map,
        max_depth = ?env.max_depth,
        "inbound envelope"
    );
}
