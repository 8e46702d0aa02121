//! Manuscript viewer client library.
//!
//! Identity bootstrap, shared API client and route table for the
//! manuscript viewer (home → traditions → manuscripts → folios).

// Core subsystems
pub mod config;
pub mod http;
pub mod identity;
pub mod routing;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::schema::ViewerConfig;
pub use http::ApiClient;
pub use identity::{IdentityProvider, KeycloakClient, Session};
pub use lifecycle::{bootstrap, Application, BootstrapOutcome, MountPoint};
pub use routing::Router;
