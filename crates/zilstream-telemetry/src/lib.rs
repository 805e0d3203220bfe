//! Prometheus metrics and structured logging for ZilStream.
//!
//! - Prometheus metrics for poll outcomes, alerts, wallet state and
//!   portfolio value
//! - Structured logging with tracing (JSON in production)

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{init_logging, DEFAULT_FILTER};
pub use metrics::{encode_metrics, Metrics};
