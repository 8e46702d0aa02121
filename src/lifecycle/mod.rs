//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Identity init → token → Authorization default on the API client
//!     → install router → mount (mount.rs)
//!
//! On any handshake failure:
//!     log once → stay unmounted
//! ```
//!
//! # Design Decisions
//! - Ordered startup: identity first, then credentials, then mount
//! - Login is mandatory before anything renders

pub mod mount;
pub mod startup;

pub use mount::{Application, Mount, MountError, MountPoint};
pub use startup::{bootstrap, BootstrapError, BootstrapOutcome};
