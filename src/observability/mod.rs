//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers, dispatcher and upstream client produce:
//!     → logging.rs (structured log events, request ID in the trace span)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;
