//! Telemetry: structured logging, Prometheus metrics, latency statistics.

pub mod error;
pub mod latency;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use latency::{LatencySnapshot, LatencyStats, DEFAULT_WINDOW_SIZE};
pub use logging::{init_logging, init_logging_with_default};
