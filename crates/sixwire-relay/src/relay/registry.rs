//! Connection registry: device identifier -> live session.

use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::mpsc;

use std::sync::atomic::{AtomicU64, Ordering};

/// One session's outbound queue sender plus its registry-issued id.
///
/// The registry borrows the session's writer; the socket itself stays owned
/// by the transport loop.
#[derive(Clone)]
pub struct Connection {
    pub session_id: u64,
    pub tx: mpsc::Sender<Message>,
}

/// `device_id -> Connection`.
///
/// At most one live entry per device identifier; a later registration for the
/// same identifier silently replaces the earlier one.
#[derive(Default)]
pub struct ConnectionRegistry {
    devices: DashMap<String, Connection>,
    next_session_id: AtomicU64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            devices: DashMap::new(),
            next_session_id: AtomicU64::new(1),
        }
    }

    /// Issue an id for a newly accepted session.
    pub fn issue_session_id(&self) -> u64 {
        self.next_session_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Map `device_id` to `conn`, unconditionally replacing any prior mapping.
    pub fn register(&self, device_id: &str, conn: Connection) {
        self.devices.insert(device_id.to_string(), conn);
    }

    /// Current session for `device_id`. Absence is a normal, frequent
    /// outcome: the receiver is simply offline.
    pub fn lookup(&self, device_id: &str) -> Option<Connection> {
        self.devices.get(device_id).map(|e| e.value().clone())
    }

    /// Drop the entry owned by `session_id`, if any, and return its device
    /// id. No-op when the session never identified itself.
    ///
    /// A device that reconnected keeps its fresh entry: removal is guarded on
    /// the session id still matching.
    pub fn unregister_by_session(&self, session_id: u64) -> Option<String> {
        let device_id = self
            .devices
            .iter()
            .find(|e| e.value().session_id == session_id)
            .map(|e| e.key().clone())?;
        self.devices
            .remove_if(&device_id, |_, conn| conn.session_id == session_id)?;
        tracing::info!(%device_id, session_id, "client disconnected");
        Some(device_id)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
