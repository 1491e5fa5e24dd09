//! sixwire core: transport-agnostic protocol primitives and error types.
//!
//! This crate defines the command envelope, the forwarding enumerations, the
//! search-path transformation, and the error surface shared with the relay.
//! It intentionally carries no transport or runtime dependencies so it can be
//! reused by tooling and tests.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `SixwireError`/`Result` so production
//! processes do not crash on malformed input or bad traffic.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod geo;
pub mod protocol;

/// Shared result type.
pub use error::{Result, SixwireError};
