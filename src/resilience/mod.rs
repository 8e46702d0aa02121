//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to the identity provider:
//!     → backoff.rs (attempt, on failure wait and retry)
//!     → last error surfaces to the caller
//! ```
//!
//! # Design Decisions
//! - Retrying is opt-in per call site; the default policy tries once
//! - Jittered backoff prevents thundering herd on provider restarts
//! - Every external call has a deadline (set on the reqwest client)

pub mod backoff;

pub use backoff::RetryPolicy;
