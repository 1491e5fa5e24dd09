//! Shared application state for the relay.

use std::sync::Arc;

use crate::config::RelayConfig;
use crate::obs::RelayMetrics;
use crate::relay::{CommandRouter, ConnectionRegistry};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: RelayConfig,
    registry: Arc<ConnectionRegistry>,
    router: CommandRouter,
    metrics: Arc<RelayMetrics>,
}

impl AppState {
    pub fn new(cfg: RelayConfig) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let metrics = Arc::new(RelayMetrics::default());
        let router = CommandRouter::new(Arc::clone(&registry), Arc::clone(&metrics));
        Self {
            inner: Arc::new(AppStateInner {
                cfg,
                registry,
                router,
                metrics,
            }),
        }
    }

    pub fn cfg(&self) -> &RelayConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.inner.registry
    }

    pub fn router(&self) -> &CommandRouter {
        &self.inner.router
    }

    pub fn metrics(&self) -> &RelayMetrics {
        &self.inner.metrics
    }
}
