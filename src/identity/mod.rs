//! Identity subsystem.
//!
//! # Data Flow
//! ```text
//! IdentityConfig (server URL, realm, client id, grant)
//!     → keycloak.rs: well-known discovery (optionally retried)
//!     → token endpoint (password / client credentials) or issued token
//!     → JWKS signing key → verify token → claims.rs (UserClaims)
//!     → provider.rs: Session { authenticated, token, claims }
//! ```
//!
//! # Design Decisions
//! - Two handshake outcomes (authenticated / not) travel in `Ok`
//! - Network and protocol failures travel in `Err`
//! - The provider is a trait so bootstrap can run against any source of sessions

pub mod claims;
pub mod error;
pub mod keycloak;
pub mod provider;

pub use claims::{ClientAccess, UserClaims};
pub use error::IdentityError;
pub use keycloak::{KeycloakClient, ProviderMetadata, SigningKey};
pub use provider::{IdentityProvider, Session};
