//! Command routing: per-receiver forwarding rules.
//!
//! Classifies an inbound envelope by `(command, specific)` and applies the
//! matching rule. Everything here is a successful forward, a silent no-op, or
//! a logged drop; nothing reports failure back to the sending device.

use std::sync::Arc;

use axum::extract::ws::Message;
use serde_json::Value;

use sixwire_core::protocol::envelope::{coerce_rating, CommandEnvelope, ForwardPayload};
use sixwire_core::protocol::path;
use sixwire_core::protocol::{Command, Specific};

use crate::obs::RelayMetrics;
use crate::relay::registry::{Connection, ConnectionRegistry};

pub struct CommandRouter {
    registry: Arc<ConnectionRegistry>,
    metrics: Arc<RelayMetrics>,
}

impl CommandRouter {
    pub fn new(registry: Arc<ConnectionRegistry>, metrics: Arc<RelayMetrics>) -> Self {
        Self { registry, metrics }
    }

    /// Route one inbound envelope to completion.
    pub fn dispatch(&self, env: &CommandEnvelope) {
        let command = match env.command.as_deref().map(Command::parse) {
            Some(Some(c)) => c,
            _ => {
                tracing::warn!(
                    command = env.command.as_deref().unwrap_or("<absent>"),
                    "unknown command"
                );
                self.metrics.dropped.inc(&[("reason", "unknown_command")]);
                return;
            }
        };

        match command {
            Command::Message => self.handle_message(env),
        }
    }

    fn handle_message(&self, env: &CommandEnvelope) {
        let receivers = match env.receivers.as_deref() {
            Some(r) if !r.is_empty() => r,
            _ => {
                tracing::warn!("empty receivers list");
                self.metrics.dropped.inc(&[("reason", "empty_receivers")]);
                return;
            }
        };
        tracing::debug!(count = receivers.len(), "receiver count");

        let sender = env.device_id.as_deref();
        for receiver in receivers {
            // no self-delivery; offline receivers are skipped, not failed
            if sender == Some(receiver.as_str()) {
                continue;
            }
            let Some(conn) = self.registry.lookup(receiver) else {
                continue;
            };

            let specific = match env.specific.as_deref().map(Specific::parse) {
                Some(Some(s)) => s,
                _ => {
                    tracing::warn!(
                        specific = env.specific.as_deref().unwrap_or("<absent>"),
                        "unknown specific"
                    );
                    self.metrics.dropped.inc(&[("reason", "unknown_specific")]);
                    continue;
                }
            };

            // fresh copy per receiver: handlers mutate it independently
            let payload = ForwardPayload::from_envelope(env);

            match specific {
                Specific::Search | Specific::SearchListing | Specific::CastListing => {
                    self.forward_depth_tracked(env, payload, receiver, &conn, specific);
                }
                Specific::Attach => self.forward_attach(env, payload, receiver, &conn),
                Specific::Detach => self.forward_detach(env, payload, receiver, &conn),
                Specific::Result => self.forward_result(env, payload),
                Specific::Chat => self.forward_chat(env, payload, receiver, &conn),
                Specific::Rating => self.forward_rating(env, payload, receiver, &conn),
            }
        }
    }

    /// SEARCH / SEARCH_LISTING / CAST_LISTING: advance the path over this
    /// hop, coerce the rating, deliver `{ deviceId, data }`.
    fn forward_depth_tracked(
        &self,
        env: &CommandEnvelope,
        mut payload: ForwardPayload,
        receiver: &str,
        conn: &Connection,
        specific: Specific,
    ) {
        path::advance(&mut payload, receiver);
        payload.rating = Some(Value::from(coerce_rating(env.rating.as_ref())));
        tracing::debug!(
            depth = payload.current_search_depth.unwrap_or(0),
            search_path = ?payload.search_path_map,
            %receiver,
            "depth-tracked forward"
        );
        let Some(data) = payload_value(&payload) else {
            return;
        };
        self.deliver(
            conn,
            frame(sender_field(env), "data", data),
            specific,
        );
    }

    /// ATTACH is bidirectional: each side receives a payload naming the
    /// counterpart, so both ends act on the new channel. The receiver-bound
    /// copy rides under `data2`, the sender-bound copy under `data`.
    fn forward_attach(
        &self,
        env: &CommandEnvelope,
        payload: ForwardPayload,
        receiver: &str,
        conn: &Connection,
    ) {
        let sender = env.device_id.as_deref();
        tracing::debug!(
            sender = sender.unwrap_or("<unidentified>"),
            %receiver,
            "attach"
        );

        let mut to_receiver = payload.clone();
        to_receiver.device_id = env.device_id.clone();
        if let Some(data2) = payload_value(&to_receiver) {
            self.deliver(conn, frame(None, "data2", data2), Specific::Attach);
        }

        let mut to_sender = payload;
        to_sender.device_id = Some(receiver.to_string());
        if let Some(sender_conn) = sender.and_then(|id| self.registry.lookup(id)) {
            if let Some(data) = payload_value(&to_sender) {
                self.deliver(&sender_conn, frame(None, "data", data), Specific::Attach);
            }
        }
    }

    /// DETACH is unidirectional: only the receiver needs to act.
    fn forward_detach(
        &self,
        env: &CommandEnvelope,
        payload: ForwardPayload,
        receiver: &str,
        conn: &Connection,
    ) {
        tracing::debug!(
            sender = env.device_id.as_deref().unwrap_or("<unidentified>"),
            %receiver,
            "detach"
        );
        let Some(data) = payload_value(&payload) else {
            return;
        };
        self.deliver(conn, frame(sender_field(env), "data", data), Specific::Detach);
    }

    /// RESULT bubbles back to the search originator, not to the receiver the
    /// envelope names. Dropped when no originator is declared.
    fn forward_result(&self, env: &CommandEnvelope, payload: ForwardPayload) {
        let Some(origin) = env.origin_device_id.as_deref() else {
            self.metrics.dropped.inc(&[("reason", "result_no_origin")]);
            return;
        };
        let Some(conn) = self.registry.lookup(origin) else {
            return;
        };
        let Some(data) = payload_value(&payload) else {
            return;
        };
        self.deliver(
            &conn,
            frame(Some(("originDeviceId", origin)), "data", data),
            Specific::Result,
        );
    }

    fn forward_chat(
        &self,
        env: &CommandEnvelope,
        payload: ForwardPayload,
        receiver: &str,
        conn: &Connection,
    ) {
        tracing::debug!(
            sender = env.device_id.as_deref().unwrap_or("<unidentified>"),
            %receiver,
            "chat"
        );
        let Some(data) = payload_value(&payload) else {
            return;
        };
        self.deliver(conn, frame(None, "data", data), Specific::Chat);
    }

    /// RATING stamps the sender identity into the payload and coerces the
    /// rating to floating point before forwarding.
    fn forward_rating(
        &self,
        env: &CommandEnvelope,
        mut payload: ForwardPayload,
        receiver: &str,
        conn: &Connection,
    ) {
        tracing::debug!(
            sender = env.device_id.as_deref().unwrap_or("<unidentified>"),
            %receiver,
            "rating"
        );
        payload.sender = env.device_id.clone();
        payload.rating = Some(Value::from(coerce_rating(env.rating.as_ref())));
        let Some(data) = payload_value(&payload) else {
            return;
        };
        self.deliver(conn, frame(None, "data", data), Specific::Rating);
    }

    /// Fire-and-forget enqueue onto the receiver session's writer. A full or
    /// closed queue drops the frame; the sender never learns either way.
    fn deliver(&self, conn: &Connection, frame: Value, specific: Specific) {
        let text = match serde_json::to_string(&frame) {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(error = %e, "frame encode failed");
                return;
            }
        };
        if conn.tx.try_send(Message::Text(text)).is_err() {
            self.metrics.dropped.inc(&[("reason", "queue_full")]);
            return;
        }
        self.metrics
            .forwards
            .inc(&[("specific", specific.as_str())]);
    }
}

fn sender_field(env: &CommandEnvelope) -> Option<(&'static str, &str)> {
    env.device_id.as_deref().map(|id| ("deviceId", id))
}

/// Outbound wrapper: an optional top-level identity field plus the payload
/// under `data_key` (`data`, or `data2` for the receiver side of ATTACH).
fn frame(id_field: Option<(&'static str, &str)>, data_key: &'static str, data: Value) -> Value {
    let mut obj = serde_json::Map::new();
    if let Some((key, id)) = id_field {
        obj.insert(key.to_string(), Value::String(id.to_string()));
    }
    obj.insert(data_key.to_string(), data);
    Value::Object(obj)
}

fn payload_value(payload: &ForwardPayload) -> Option<Value> {
    match serde_json::to_value(payload) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(error = %e, "payload encode failed");
            None
        }
    }
}
