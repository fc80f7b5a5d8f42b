//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! rpc, chain, sim produce:
//!     → tracing events (structured fields, never secrets)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → logging.rs subscriber (stderr: pretty, compact or JSON)
//!     → Prometheus listener (optional)
//! ```
//!
//! # Design Decisions
//! - Library code only emits; the binary decides where output goes
//! - `RUST_LOG` overrides the configured level
//! - Metrics are no-ops without an exporter

pub mod logging;
pub mod metrics;
