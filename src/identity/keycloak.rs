//! OpenID Connect client for a Keycloak realm.
//!
//! # Responsibilities
//! - Discover the realm's endpoints from its well-known document
//! - Exchange the configured grant for an access token
//! - Verify the token against the realm's signing key and decode its claims
//!
//! # Design Decisions
//! - Rejected credentials are an unauthenticated session, not an error
//! - Unreachable or misbehaving providers are errors
//! - Discovery may be retried (provider starting up); token calls never are

use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::jwk::Jwk;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use crate::config::{GrantConfig, IdentityConfig, OnLoad};
use crate::identity::claims::UserClaims;
use crate::identity::error::IdentityError;
use crate::identity::provider::{IdentityProvider, Session};
use crate::resilience::RetryPolicy;

/// Subset of the OpenID provider metadata the viewer relies on.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProviderMetadata {
    pub issuer: String,
    #[serde(default)]
    pub authorization_endpoint: Option<String>,
    pub token_endpoint: String,
    pub jwks_uri: String,
    #[serde(default)]
    pub grant_types_supported: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JwkSetDocument {
    keys: Vec<Value>,
}

/// Public key used to check token signatures.
pub struct SigningKey {
    pub algorithm: Algorithm,
    pub kid: Option<String>,
    key: DecodingKey,
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("algorithm", &self.algorithm)
            .field("kid", &self.kid)
            .finish_non_exhaustive()
    }
}

impl SigningKey {
    /// Verify the signature and expiry of `token` and decode its claims.
    ///
    /// The audience is not checked: Keycloak access tokens name `account`
    /// rather than the public client.
    pub fn verify(&self, token: &str) -> Result<UserClaims, IdentityError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_aud = false;

        decode::<UserClaims>(token, &self.key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    IdentityError::InvalidCredentials("Token has expired.".to_string())
                }
                _ => IdentityError::InvalidCredentials(format!("Error decoding the token: {}", e)),
            })
    }
}

/// Identity provider backed by a Keycloak realm.
#[derive(Debug, Clone)]
pub struct KeycloakClient {
    config: IdentityConfig,
    http: Client,
    discovery_policy: RetryPolicy,
}

impl KeycloakClient {
    /// Create a client from configuration. No network traffic happens here.
    pub fn new(config: &IdentityConfig) -> Result<Self, IdentityError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let discovery_policy = if config.retry {
            RetryPolicy::fixed(config.max_attempts, Duration::from_millis(config.retry_delay_ms))
        } else {
            RetryPolicy::once()
        };

        Ok(Self {
            config: config.clone(),
            http,
            discovery_policy,
        })
    }

    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }

    /// `{server}/realms/{realm}/.well-known/openid-configuration`
    pub fn well_known_uri(&self) -> String {
        format!(
            "{}/realms/{}/.well-known/openid-configuration",
            self.config.server_url.trim_end_matches('/'),
            self.config.realm
        )
    }

    /// Fetch the provider metadata, retrying if configured to.
    pub async fn discover(&self) -> Result<ProviderMetadata, IdentityError> {
        let uri = self.well_known_uri();
        let uri_ref = uri.as_str();

        let metadata = self
            .discovery_policy
            .retry("oidc-discovery", move |_| self.fetch_metadata(uri_ref))
            .await?;

        tracing::info!(uri = %uri, issuer = %metadata.issuer, "Retrieved OIDC metadata");
        Ok(metadata)
    }

    async fn fetch_metadata(&self, uri: &str) -> Result<ProviderMetadata, IdentityError> {
        let discovery_error = |reason: String| IdentityError::Discovery {
            uri: uri.to_string(),
            reason,
        };

        let response = self
            .http
            .get(uri)
            .send()
            .await
            .map_err(|e| discovery_error(e.to_string()))?;

        if response.status() != StatusCode::OK {
            return Err(discovery_error(format!("status code {}", response.status().as_u16())));
        }

        response
            .json::<ProviderMetadata>()
            .await
            .map_err(|e| discovery_error(e.to_string()))
    }

    /// Load the first JWKS key whose algorithm is accepted.
    pub async fn fetch_signing_key(
        &self,
        metadata: &ProviderMetadata,
    ) -> Result<SigningKey, IdentityError> {
        let response = self.http.get(&metadata.jwks_uri).send().await?;
        if !response.status().is_success() {
            return Err(IdentityError::Protocol(format!(
                "JWKS endpoint returned status {}",
                response.status().as_u16()
            )));
        }
        let document: JwkSetDocument = response.json().await?;
        self.select_signing_key(document.keys)
    }

    fn select_signing_key(&self, keys: Vec<Value>) -> Result<SigningKey, IdentityError> {
        for mut raw in keys {
            let Some(alg) = raw.get("alg").and_then(Value::as_str).map(str::to_uppercase) else {
                continue;
            };
            if !self.config.algorithms.iter().any(|accepted| accepted.to_uppercase() == alg) {
                continue;
            }
            if let Some(fields) = raw.as_object_mut() {
                fields.insert("alg".to_string(), Value::from(alg.as_str()));
            }

            let algorithm = Algorithm::from_str(&alg)?;
            let jwk: Jwk = serde_json::from_value(raw)
                .map_err(|e| IdentityError::Protocol(format!("malformed JWK: {}", e)))?;
            let key = DecodingKey::from_jwk(&jwk)?;

            tracing::debug!(alg = %alg, kid = ?jwk.common.key_id, "Selected signing key");
            return Ok(SigningKey {
                algorithm,
                kid: jwk.common.key_id.clone(),
                key,
            });
        }

        Err(IdentityError::UnsupportedAlgorithm(self.config.algorithms.clone()))
    }

    /// Exchange the configured credentials at the token endpoint.
    pub async fn request_token(&self, metadata: &ProviderMetadata) -> Result<Session, IdentityError> {
        let Some(grant_type) = self.config.grant.grant_type() else {
            return Err(IdentityError::Protocol(
                "configured grant does not use the token endpoint".to_string(),
            ));
        };

        if !metadata.grant_types_supported.is_empty()
            && !metadata.grant_types_supported.iter().any(|g| g == grant_type)
        {
            return Err(IdentityError::Protocol(format!(
                "issuer does not support the '{}' grant",
                grant_type
            )));
        }

        let mut form = vec![
            ("grant_type", grant_type.to_string()),
            ("client_id", self.config.client_id.clone()),
        ];
        match &self.config.grant {
            GrantConfig::Password { username, password } => {
                form.push(("username", username.clone()));
                form.push(("password", password.clone()));
                form.push(("scope", "openid".to_string()));
            }
            GrantConfig::ClientCredentials { client_secret } => {
                form.push(("client_secret", client_secret.clone()));
            }
            GrantConfig::Token { .. } => {}
        }

        let response = self.http.post(&metadata.token_endpoint).form(&form).send().await?;
        let status = response.status();

        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            let body: TokenErrorResponse = response.json().await.unwrap_or_default();
            tracing::warn!(
                status = %status,
                error = body.error.as_deref().unwrap_or("unknown"),
                description = body.error_description.as_deref().unwrap_or(""),
                "Token request rejected"
            );
            return Ok(Session::unauthenticated());
        }
        if !status.is_success() {
            return Err(IdentityError::Protocol(format!(
                "token endpoint returned status {}",
                status.as_u16()
            )));
        }

        let token: TokenResponse = response.json().await?;
        Ok(Session {
            authenticated: true,
            token: Some(token.access_token),
            refresh_token: token.refresh_token,
            expires_in: token.expires_in,
            claims: None,
        })
    }

    async fn obtain_session(&self, metadata: &ProviderMetadata) -> Result<Session, IdentityError> {
        match (&self.config.grant, self.config.on_load) {
            (GrantConfig::Token { access_token }, _) => {
                if access_token.is_empty() {
                    tracing::warn!("No access token configured");
                    Ok(Session::unauthenticated())
                } else {
                    Ok(Session::bearer(access_token.clone()))
                }
            }
            (_, OnLoad::CheckSso) => {
                tracing::info!("check-sso: no issued token available, credentials not exchanged");
                Ok(Session::unauthenticated())
            }
            (_, OnLoad::LoginRequired) => self.request_token(metadata).await,
        }
    }
}

impl IdentityProvider for KeycloakClient {
    async fn init(&self) -> Result<Session, IdentityError> {
        if !self.config.enabled {
            tracing::info!("Authentication disabled, using anonymous session");
            return Ok(Session::anonymous(&self.config.client_id));
        }

        let metadata = self.discover().await?;
        let session = self.obtain_session(&metadata).await?;

        if !session.authenticated || !self.config.verify_token {
            return Ok(session);
        }
        let Some(token) = session.token.as_deref() else {
            return Ok(session);
        };

        let key = self.fetch_signing_key(&metadata).await?;
        match key.verify(token) {
            Ok(claims) => {
                tracing::info!(
                    user = claims.preferred_username.as_deref().unwrap_or("unknown"),
                    "Token verified"
                );
                Ok(session.with_claims(claims))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token rejected");
                Ok(Session::unauthenticated())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(config: IdentityConfig) -> KeycloakClient {
        KeycloakClient::new(&config).unwrap()
    }

    #[test]
    fn test_well_known_uri() {
        let mut config = IdentityConfig::default();
        config.server_url = "http://localhost:8024/".into();
        assert_eq!(
            client(config).well_known_uri(),
            "http://localhost:8024/realms/theolab/.well-known/openid-configuration"
        );
    }

    #[test]
    fn test_retry_policy_follows_config() {
        let mut config = IdentityConfig::default();
        assert_eq!(client(config.clone()).discovery_policy.max_attempts, 1);

        config.retry = true;
        config.max_attempts = 7;
        config.retry_delay_ms = 20;
        let policy = client(config).discovery_policy;
        assert_eq!(policy.max_attempts, 7);
        assert_eq!(policy.base_delay, Duration::from_millis(20));
    }

    #[test]
    fn test_select_signing_key_skips_unaccepted() {
        let keycloak = client(IdentityConfig::default());
        let keys = vec![
            serde_json::json!({ "kty": "oct", "k": "c2VjcmV0", "alg": "HS256" }),
            serde_json::json!({ "kty": "RSA", "kid": "rsa-1", "alg": "rs256", "n": "AQAB", "e": "AQAB" }),
        ];
        let key = keycloak.select_signing_key(keys).unwrap();
        assert_eq!(key.algorithm, Algorithm::RS256);
        assert_eq!(key.kid.as_deref(), Some("rsa-1"));
    }

    #[test]
    fn test_select_signing_key_none_accepted() {
        let keycloak = client(IdentityConfig::default());
        let keys = vec![serde_json::json!({ "kty": "oct", "k": "c2VjcmV0", "alg": "HS256" })];
        assert!(matches!(
            keycloak.select_signing_key(keys),
            Err(IdentityError::UnsupportedAlgorithm(_))
        ));
    }

    #[tokio::test]
    async fn test_disabled_yields_anonymous_session() {
        let mut config = IdentityConfig::default();
        config.enabled = false;
        // Unroutable server: nothing must be contacted.
        config.server_url = "http://127.0.0.1:9".into();

        let session = client(config).init().await.unwrap();
        assert!(session.authenticated);
        assert!(session.token.is_none());
        assert!(session.claims.unwrap().has_roles(&["read"], "qwb-api", true));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_discovery_error() {
        let mut config = IdentityConfig::default();
        config.server_url = "http://127.0.0.1:9".into();
        config.timeout_secs = 1;

        let err = client(config).init().await.unwrap_err();
        assert!(matches!(err, IdentityError::Discovery { .. }));
        assert!(!err.is_auth_failure());
    }
}
