//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (bootstrap and navigation counters)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Prometheus recorder (installed by the binary, rendered on demand)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Tokens never appear in log fields
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
