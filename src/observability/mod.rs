//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (tracing events with structured fields)
//!     → metrics.rs (counters and gauges via the metrics facade)
//!
//! Consumers:
//!     → stdout (fmt layer, filtered by RUST_LOG / --log-level)
//!     → Prometheus scrape listener (only when METRICS_ADDR is set)
//!     → status.rs (periodic status line, /status JSON)
//! ```
//!
//! # Design Decisions
//! - Metric calls are no-ops until a recorder is installed
//! - Status collection reads shared snapshots, never orchestration internals

pub mod logging;
pub mod metrics;
pub mod status;

pub use status::{ServiceStatus, StatusReporter};
