//! Identity provider contract and session state.

use std::future::Future;

use crate::identity::claims::UserClaims;
use crate::identity::error::IdentityError;

/// Result of a completed handshake.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    /// Whether the provider accepted the user.
    pub authenticated: bool,
    /// Access token to present as `Authorization: Bearer <token>`.
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    /// Token lifetime in seconds, as reported by the token endpoint.
    pub expires_in: Option<u64>,
    /// Verified claims, when signature checking is enabled.
    pub claims: Option<UserClaims>,
}

impl Session {
    /// A session the provider did not authenticate.
    pub fn unauthenticated() -> Self {
        Self::default()
    }

    /// An authenticated session without a token (authentication disabled).
    pub fn anonymous(client_id: &str) -> Self {
        Self {
            authenticated: true,
            claims: Some(UserClaims::anonymous(client_id)),
            ..Self::default()
        }
    }

    /// An authenticated session carrying an access token.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            token: Some(token.into()),
            ..Self::default()
        }
    }

    pub fn with_claims(mut self, claims: UserClaims) -> Self {
        self.claims = Some(claims);
        self
    }

    /// Name to show in logs.
    pub fn username(&self) -> Option<&str> {
        self.claims.as_ref()?.preferred_username.as_deref()
    }
}

/// Something that can authenticate the user before the application mounts.
///
/// `Ok` carries both handshake outcomes (authenticated or not); `Err` is
/// reserved for network and protocol failures.
pub trait IdentityProvider {
    fn init(&self) -> impl Future<Output = Result<Session, IdentityError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_constructors() {
        let session = Session::bearer("abc");
        assert!(session.authenticated);
        assert_eq!(session.token.as_deref(), Some("abc"));

        let anonymous = Session::anonymous("qwb-api");
        assert!(anonymous.authenticated);
        assert!(anonymous.token.is_none());

        assert!(!Session::unauthenticated().authenticated);
    }

    #[test]
    fn test_username_from_claims() {
        let claims = UserClaims {
            preferred_username: Some("reader".into()),
            ..UserClaims::default()
        };
        assert_eq!(Session::bearer("t").with_claims(claims).username(), Some("reader"));
        assert_eq!(Session::bearer("t").username(), None);
    }
}
