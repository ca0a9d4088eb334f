//! Process-local telemetry for the adaptive landing service.
//!
//! Counters, gauges and latency histograms live in a global registry and are
//! served as a JSON snapshot; component health feeds the readiness probes.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;
