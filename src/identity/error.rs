//! Identity error taxonomy.

use thiserror::Error;

/// Errors raised while establishing or checking a session.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Not allowed: {0}")]
    NotAllowed(String),

    #[error("Failed to fetch OIDC metadata from {uri}: {reason}")]
    Discovery { uri: String, reason: String },

    #[error("OpenID Connect issuer does not support any of the accepted algorithms: {0:?}")]
    UnsupportedAlgorithm(Vec<String>),

    #[error("Identity protocol error: {0}")]
    Protocol(String),

    #[error("Identity provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl IdentityError {
    /// True for the errors that mean "the credentials were rejected", as
    /// opposed to the provider being unreachable or misbehaving.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            IdentityError::Unauthorized
                | IdentityError::InvalidCredentials(_)
                | IdentityError::NotAllowed(_)
        )
    }
}
