//! Relay core: connection registry and command routing.

mod dispatch;
mod registry;

pub use dispatch::CommandRouter;
pub use registry::{Connection, ConnectionRegistry};
