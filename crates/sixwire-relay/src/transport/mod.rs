//! Transport layer: WebSocket upgrade and the per-session event loop.

pub mod ws;
