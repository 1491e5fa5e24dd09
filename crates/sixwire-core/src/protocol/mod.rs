//! Wire-level protocol: command envelope, forwarding tags, path tracking.

pub mod command;
pub mod envelope;
pub mod path;

pub use command::{Command, Specific};
pub use envelope::{CommandEnvelope, ForwardPayload, SearchPathMap};
