//! Observability: in-process metrics registry.

mod metrics;

pub use metrics::{CounterVec, GaugeVec, RelayMetrics};
