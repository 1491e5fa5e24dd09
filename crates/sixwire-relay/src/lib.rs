//! sixwire relay library entry.
//!
//! This crate wires the transport loop, connection registry, command router,
//! config, and metrics into a cohesive relay stack. It is intended to be
//! consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod obs;
pub mod relay;
pub mod router;
pub mod transport;
