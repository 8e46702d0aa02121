//! HTTP client subsystem.
//!
//! # Data Flow
//! ```text
//! view / shell asks for a resource path
//!     → client.rs (resolve against base URL)
//!     → attach default headers (Authorization after bootstrap)
//!     → reqwest
//!     → status check, JSON decode
//! ```

pub mod client;

pub use client::{ApiClient, ApiError};
