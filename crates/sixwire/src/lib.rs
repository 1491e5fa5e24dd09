//! Top-level facade crate for sixwire.
//!
//! Re-exports core types and the relay library so users can depend on a single crate.

pub mod core {
    pub use sixwire_core::*;
}

pub mod relay {
    pub use sixwire_relay::*;
}
