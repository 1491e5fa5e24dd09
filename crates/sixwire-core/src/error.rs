//! Shared error type across sixwire crates.

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, SixwireError>;

/// Unified error type used by core and relay.
///
/// Protocol anomalies (unknown tags, absent receivers, offline receivers) are
/// not errors: the router handles them as logged no-ops at the point of
/// detection and nothing propagates back to the sending device. This type
/// covers config loading, startup, and decode plumbing only.
#[derive(Debug, Error)]
pub enum SixwireError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}
